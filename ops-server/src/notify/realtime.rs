//! 实时广播中心
//!
//! # 架构
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                RealtimeHub                   │
//! │  channel "restaurant:{id}" ──► broadcast tx  │
//! │  channel "order:{id}"      ──► broadcast tx  │
//! └──────────────────────────────────────────────┘
//!            │                       │
//!      餐厅看板订阅             单个订单跟踪订阅
//! ```
//!
//! Fire-and-forget：无持久化、无重放，掉线的订阅者自行重新拉取状态。

use dashmap::DashMap;
use serde::Serialize;
use shared::order::{Order, OrderEventKind, OrderStatus, PaymentStatus};
use tokio::sync::broadcast;

/// 每个通道的默认容量
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// 广播到订阅者的订单更新
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeUpdate {
    pub kind: OrderEventKind,
    pub order_id: String,
    pub restaurant_id: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<OrderStatus>,
    pub total: f64,
    pub timestamp: i64,
}

impl RealtimeUpdate {
    pub fn from_order(order: &Order, kind: OrderEventKind, previous_status: Option<OrderStatus>) -> Self {
        Self {
            kind,
            order_id: order.id.clone(),
            restaurant_id: order.restaurant_id.clone(),
            status: order.status,
            payment_status: order.payment_status,
            previous_status,
            total: order.charges.total,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// 实时广播中心 - 按通道隔离的 broadcast 扇出
///
/// 通道命名:
/// - `restaurant:{id}` - 餐厅级看板
/// - `order:{id}` - 单个订单跟踪
#[derive(Debug)]
pub struct RealtimeHub {
    channels: DashMap<String, broadcast::Sender<RealtimeUpdate>>,
    capacity: usize,
}

/// Restaurant-wide dashboard channel name
pub fn restaurant_channel(restaurant_id: &str) -> String {
    format!("restaurant:{}", restaurant_id)
}

/// Single-order tracking channel name
pub fn order_channel(order_id: &str) -> String {
    format!("order:{}", order_id)
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity,
        }
    }

    /// 订阅一个通道 (没有则创建)
    pub fn subscribe(&self, channel: &str) -> broadcast::Receiver<RealtimeUpdate> {
        self.channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// 发布到单个通道
    ///
    /// 没有订阅者不算错误 (fire-and-forget)
    pub fn publish(&self, channel: &str, update: RealtimeUpdate) {
        if let Some(tx) = self.channels.get(channel)
            && tx.send(update).is_err()
        {
            tracing::debug!(channel, "Realtime publish without active receivers");
        }
    }

    /// 广播一次订单更新到餐厅通道和订单通道
    ///
    /// 两个作用域分开发布，餐厅看板和单客户订单跟踪各自收到。
    pub fn publish_order_update(
        &self,
        order: &Order,
        kind: OrderEventKind,
        previous_status: Option<OrderStatus>,
    ) {
        let update = RealtimeUpdate::from_order(order, kind, previous_status);
        self.publish(&restaurant_channel(&order.restaurant_id), update.clone());
        self.publish(&order_channel(&order.id), update);
    }
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}
