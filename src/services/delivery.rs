//! Message delivery: splits long text into chat-sized chunks and hands them
//! to the messenger.

use crate::error::{AppError, Result};
use crate::sources::Messenger;
use std::sync::Arc;
use tracing::{debug, error};

/// Telegram caps messages at 4096 characters; leave headroom.
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 4000;

fn push_chunk(chunks: &mut Vec<String>, chunk: String) {
    if !chunk.trim().is_empty() {
        chunks.push(chunk);
    }
}

fn hard_split(line: &str, max: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    chars.chunks(max).map(|c| c.iter().collect()).collect()
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Chunks break on line boundaries; a single line longer than the limit is
/// split mid-line. Whitespace-only chunks are dropped.
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<String> {
    let max = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        let pieces = if line_len > max {
            hard_split(line, max)
        } else {
            vec![line.to_string()]
        };

        for piece in pieces {
            let piece_len = piece.chars().count();
            if !current.is_empty() && current_len + 1 + piece_len > max {
                push_chunk(&mut chunks, std::mem::take(&mut current));
                current_len = 0;
            }
            if !current.is_empty() {
                current.push('\n');
                current_len += 1;
            }
            current.push_str(&piece);
            current_len += piece_len;
        }
    }
    push_chunk(&mut chunks, current);
    chunks
}

/// Sends text and images through a messenger.
#[derive(Clone)]
pub struct Dispatcher {
    messenger: Arc<dyn Messenger>,
    max_chars: usize,
}

impl Dispatcher {
    pub fn new(messenger: Arc<dyn Messenger>, max_chars: usize) -> Self {
        Self {
            messenger,
            max_chars,
        }
    }

    /// Send every chunk of `text` and return how many went out. A failed
    /// chunk does not stop the rest; the first failure is returned once all
    /// chunks were attempted.
    pub async fn send(&self, text: &str) -> Result<usize> {
        let chunks = chunk_message(text, self.max_chars);
        let total = chunks.len();
        let mut first_error = None;

        for (i, chunk) in chunks.iter().enumerate() {
            match self.messenger.send_text(chunk).await {
                Ok(()) => debug!("Message chunk {}/{} sent", i + 1, total),
                Err(e) => {
                    error!("Message chunk {}/{} failed: {}", i + 1, total, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            None => Ok(total),
            Some(AppError::Delivery(msg)) => Err(AppError::Delivery(msg)),
            Some(other) => Err(AppError::Delivery(other.to_string())),
        }
    }

    pub async fn send_image(&self, image: &[u8], caption: &str) -> Result<()> {
        self.messenger.send_image(image, caption).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::BoxFuture;
    use std::sync::Mutex;

    #[test]
    fn test_short_message_single_chunk() {
        assert_eq!(chunk_message("hello\nworld", 4000), vec!["hello\nworld"]);
    }

    #[test]
    fn test_empty_message_has_no_chunks() {
        assert!(chunk_message("", 4000).is_empty());
        assert!(chunk_message("\n\n", 4000).is_empty());
    }

    #[test]
    fn test_splits_on_line_boundaries() {
        let text = "aaaa\nbbbb\ncccc";
        let chunks = chunk_message(text, 9);
        assert_eq!(chunks, vec!["aaaa\nbbbb", "cccc"]);
    }

    #[test]
    fn test_overlong_line_is_hard_split() {
        let chunks = chunk_message("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_chunks_respect_limit_with_multibyte_chars() {
        let text = "📈 Report line\n".repeat(500);
        let chunks = chunk_message(&text, 4000);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 4000));
        let rebuilt: usize = chunks.iter().map(|c| c.matches("Report").count()).sum();
        assert_eq!(rebuilt, 500);
    }

    /// Rejects any chunk containing "bad".
    struct PickyMessenger {
        sent: Mutex<Vec<String>>,
    }

    impl Messenger for PickyMessenger {
        fn send_text<'a>(&'a self, text: &'a str) -> BoxFuture<'a, ()> {
            Box::pin(async move {
                if text.contains("bad") {
                    return Err(AppError::ExternalApi("Bad Request".to_string()));
                }
                self.sent.lock().unwrap().push(text.to_string());
                Ok(())
            })
        }

        fn send_image<'a>(&'a self, _image: &'a [u8], _caption: &'a str) -> BoxFuture<'a, ()> {
            Box::pin(async { Ok::<_, AppError>(()) })
        }
    }

    #[test]
    fn test_dispatcher_counts_chunks() {
        let messenger = Arc::new(PickyMessenger {
            sent: Mutex::new(Vec::new()),
        });
        let dispatcher = Dispatcher::new(messenger.clone(), 9);

        let sent = tokio_test::block_on(dispatcher.send("aaaa\nbbbb\ncccc")).unwrap();

        assert_eq!(sent, 2);
        assert_eq!(messenger.sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_dispatcher_sends_remaining_chunks_after_failure() {
        let messenger = Arc::new(PickyMessenger {
            sent: Mutex::new(Vec::new()),
        });
        let dispatcher = Dispatcher::new(messenger.clone(), 4);

        let result = tokio_test::block_on(dispatcher.send("good\nbad\nokay"));

        assert!(matches!(result, Err(AppError::Delivery(_))));
        assert_eq!(*messenger.sent.lock().unwrap(), vec!["good", "okay"]);
    }
}
