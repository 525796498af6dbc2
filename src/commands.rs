//! Slash command handling.
//!
//! Parses `/feed ...` command lines and executes them against the
//! subscription store. Every response is ephemeral text for the issuing
//! user; subscription changes take effect on the next heartbeat.

use crate::fetcher::validate_url;
use crate::subscriptions::SubscriptionStore;
use crate::Result;

/// Help text shown for `help` and unrecognized actions.
const COMMAND_HELP: &str = "###### Feedbeat - Slash Command Help\n\
* `/feed subscribe url` or `/feed sub url` - Connect this channel to an RSS or Atom feed\n\
* `/feed list` - Lists the feeds this channel has subscribed to\n\
* `/feed unsubscribe url` or `/feed unsub url` - Unsubscribes this channel from the feed";

/// A parsed feed command.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedCommand {
    Subscribe(String),
    Unsubscribe(String),
    List,
    Help,
}

impl FeedCommand {
    /// Parse the argument part of a command line (everything after the
    /// `/feed` trigger). Returns `Err` with an ephemeral response text
    /// when the arguments are malformed.
    pub fn parse(args: &str) -> std::result::Result<Self, String> {
        let mut fields = args.split_whitespace();
        let action = fields.next().unwrap_or("");
        let parameters: Vec<&str> = fields.collect();

        match action {
            "list" => Ok(Self::List),
            "subscribe" | "sub" => {
                let url = single_url(&parameters)?;
                Ok(Self::Subscribe(url))
            }
            "unsubscribe" | "unsub" => {
                let url = single_url(&parameters)?;
                Ok(Self::Unsubscribe(url))
            }
            _ => Ok(Self::Help),
        }
    }
}

fn single_url(parameters: &[&str]) -> std::result::Result<String, String> {
    match parameters {
        [] => Err("Please specify a url.".to_string()),
        [url] => Ok((*url).to_string()),
        _ => Err("Please specify a valid url.".to_string()),
    }
}

/// Executes feed commands against the subscription store.
pub struct CommandHandler<'a> {
    store: &'a SubscriptionStore,
}

impl<'a> CommandHandler<'a> {
    pub fn new(store: &'a SubscriptionStore) -> Self {
        Self { store }
    }

    /// Execute one command line for a channel and produce the ephemeral
    /// response text.
    pub async fn execute(&self, channel_id: &str, args: &str) -> Result<String> {
        let command = match FeedCommand::parse(args) {
            Ok(command) => command,
            Err(text) => return Ok(text),
        };

        match command {
            FeedCommand::Subscribe(url) => {
                if let Err(e) = validate_url(&url) {
                    return Ok(e.to_string());
                }
                if self.store.subscribe(channel_id, &url).await? {
                    Ok(format!("Successfully subscribed to {}.", url))
                } else {
                    Ok(format!("This channel is already subscribed to {}.", url))
                }
            }
            FeedCommand::Unsubscribe(url) => {
                self.store.unsubscribe(channel_id, &url).await?;
                Ok(format!("Successfully unsubscribed from {}.", url))
            }
            FeedCommand::List => {
                let mut text = "### Subscriptions in this channel\n".to_string();
                for subscription in self.store.list_for_channel(channel_id).await? {
                    text.push_str(&format!("* `{}`\n", subscription.url));
                }
                Ok(text)
            }
            FeedCommand::Help => Ok(COMMAND_HELP.to_string()),
        }
    }
}
