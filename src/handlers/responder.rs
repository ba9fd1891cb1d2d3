use serenity::async_trait;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use tracing::warn;

/// Discord rejects messages longer than 2000 characters.
pub const MAX_MESSAGE_CHARS: usize = 1900;

#[async_trait]
pub trait ChatResponder: Send + Sync {
    async fn typing(&self);
    async fn say(&self, content: &str);
}

pub struct SerenityResponder<'a> {
    http: &'a Http,
    channel_id: ChannelId,
}

impl<'a> SerenityResponder<'a> {
    pub fn new(http: &'a Http, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl ChatResponder for SerenityResponder<'_> {
    async fn typing(&self) {
        if let Err(err) = self.channel_id.broadcast_typing(self.http).await {
            warn!(error = ?err, "failed to send typing indicator");
        }
    }

    async fn say(&self, content: &str) {
        for chunk in split_message(content, MAX_MESSAGE_CHARS) {
            if let Err(err) = self.channel_id.say(self.http, chunk).await {
                warn!(error = ?err, channel_id = %self.channel_id, "failed to send reply");
                return;
            }
        }
    }
}

/// Prints replies to stdout; used by the CLI modes.
pub struct ConsoleResponder;

#[async_trait]
impl ChatResponder for ConsoleResponder {
    async fn typing(&self) {}

    async fn say(&self, content: &str) {
        println!("{}", content);
    }
}

/// Splits on line breaks where possible, never inside a character.
pub fn split_message(content: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for line in content.split_inclusive('\n') {
        let line_chars = line.chars().count();
        if current_chars + line_chars > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        if line_chars > max_chars {
            for c in line.chars() {
                if current_chars == max_chars {
                    chunks.push(std::mem::take(&mut current));
                    current_chars = 0;
                }
                current.push(c);
                current_chars += 1;
            }
        } else {
            current.push_str(line);
            current_chars += line_chars;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
