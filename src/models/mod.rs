pub mod directory;
pub mod inventory;
pub mod order;
pub mod product;

pub use directory::{Agent, AgentRef, SalesRep, SalesRepRef, Shop, ShopWithRep, Supplier};
pub use inventory::{InventoryRecord, InventoryView, LowInventoryRow};
pub use order::{
    NewOrder, NewOrderLine, Order, OrderLine, OrderStatus, OrderSummary, PaymentMethod,
};
pub use product::{PriceHistoryEntry, Product, ProductWithSupplier};
