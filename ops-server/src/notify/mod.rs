//! Notification fan-out: realtime broadcast, durable events, webhooks

pub mod fanout;
pub mod publisher;
pub mod realtime;
pub mod webhook;

pub use fanout::{FanoutReport, Notifier};
pub use publisher::EventPublisher;
pub use realtime::{RealtimeHub, RealtimeUpdate, order_channel, restaurant_channel};
pub use webhook::{HttpWebhook, PartnerOrder, WebhookError, WebhookSink};
