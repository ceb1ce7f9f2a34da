//! Ladle Operations Server - 多租户餐厅运营后端
//!
//! # 架构概述
//!
//! 本模块是运营后端的主入口，核心是订单履约管道：
//!
//! - **订单状态机** (`orders`): 状态校验、转换副作用、细节更新
//! - **库存扣减引擎** (`inventory`): 配方驱动的扣减与流水账
//! - **通知扇出** (`notify`): 实时广播 + 事件发布 + 外部 Webhook
//! - **存储接缝** (`store`): 可替换的存储 trait 与内存引擎
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! ops-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── orders/        # 订单状态机与金额推导
//! ├── inventory/     # 配方解析与库存扣减
//! ├── notify/        # 三通道通知扇出
//! ├── store/         # 存储 trait + 内存实现
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志等工具
//! ```

pub mod api;
pub mod core;
pub mod inventory;
pub mod notify;
pub mod orders;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use core::{AppError, Config, Server, ServerState};
pub use inventory::{DeductionEngine, RecipeResolver};
pub use notify::{Notifier, RealtimeHub};
pub use orders::{OrdersManager, TransitionError};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
