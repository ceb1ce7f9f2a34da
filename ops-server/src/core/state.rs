//! 服务器状态 - 持有所有服务的共享引用
//!
//! ServerState 是运营后端的核心数据结构。所有协作者都以注入的共享引用
//! 存在 (依赖注入)，测试可以逐项替换为假实现；没有模块级单例。
//!
//! # 服务组件
//!
//! | 字段 | 类型 | 说明 |
//! |------|------|------|
//! | config | Config | 配置项 (不可变) |
//! | orders | Arc<dyn OrderStore> | 订单存储 |
//! | inventory | Arc<dyn InventoryStore> | 库存存储 + 流水账 |
//! | events | Arc<dyn EventLog> | 事件日志 |
//! | manager | Arc<OrdersManager> | 订单状态机 |
//! | engine | Arc<DeductionEngine> | 库存扣减引擎 |
//! | realtime | Arc<RealtimeHub> | 实时广播中心 |

use std::sync::Arc;
use std::time::Duration;

use crate::core::Config;
use crate::inventory::{DeductionEngine, RecipeResolver};
use crate::notify::{EventPublisher, HttpWebhook, Notifier, RealtimeHub, WebhookSink};
use crate::orders::OrdersManager;
use crate::store::{
    EventLog, InMemoryEventLog, InMemoryInventoryStore, InMemoryOrderStore, InMemoryRecipeStore,
    InventoryStore, OrderStore, RecipeStore,
};

/// Shared server state handed to every handler
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub orders: Arc<dyn OrderStore>,
    pub inventory: Arc<dyn InventoryStore>,
    pub recipes: Arc<dyn RecipeStore>,
    pub events: Arc<dyn EventLog>,
    pub manager: Arc<OrdersManager>,
    pub engine: Arc<DeductionEngine>,
    pub realtime: Arc<RealtimeHub>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序装配：存储 → 扣减引擎 → 通知扇出 → 订单状态机。
    /// Webhook 仅在配置了 `WEBHOOK_URL` 时装配。
    pub fn initialize(config: &Config) -> Self {
        let orders: Arc<dyn OrderStore> = Arc::new(InMemoryOrderStore::new());
        let inventory: Arc<dyn InventoryStore> = Arc::new(InMemoryInventoryStore::new());
        let recipes: Arc<dyn RecipeStore> = Arc::new(InMemoryRecipeStore::new());
        let events: Arc<dyn EventLog> = Arc::new(InMemoryEventLog::new());

        let realtime = Arc::new(RealtimeHub::with_capacity(config.realtime_capacity));
        let engine = Arc::new(DeductionEngine::new(
            inventory.clone(),
            RecipeResolver::new(recipes.clone()),
        ));

        let webhook: Option<Arc<dyn WebhookSink>> = config.webhook_url.as_ref().map(|url| {
            tracing::info!(url = %url, "Delivery-platform webhook configured");
            Arc::new(HttpWebhook::new(
                url.clone(),
                Duration::from_secs(config.webhook_timeout_secs),
            )) as Arc<dyn WebhookSink>
        });

        let notifier = Arc::new(Notifier::new(
            realtime.clone(),
            Arc::new(EventPublisher::new(events.clone())),
            webhook,
            Duration::from_millis(config.sink_timeout_ms),
        ));

        let manager = Arc::new(OrdersManager::new(
            orders.clone(),
            engine.clone(),
            notifier,
            config.default_prep_minutes,
        ));

        Self {
            config: config.clone(),
            orders,
            inventory,
            recipes,
            events,
            manager,
            engine,
            realtime,
        }
    }
}
