//! The module contains the boundary to the external payment charge.
use async_trait::async_trait;
use uuid::Uuid;

use crate::Currency;

/// Outcome boundary for the external payment charge.
///
/// The engine stages a transaction fully before calling the gateway and holds
/// no lock while the call is in flight. The gateway answers with a plain
/// success flag, partial-charge states are not modeled. The call is invoked
/// exactly once per transaction and is not retried; it is also not bounded by
/// a timeout, so a hung gateway stalls only its own transaction.
#[async_trait]
pub trait ChargeGateway: Send + Sync {
    async fn charge(&self, donation_id: Uuid, amount_minor: i64, currency: Currency) -> bool;
}

/// Gateway that approves every charge.
///
/// Stands in for a real payment provider. Tests swap in declining or pausing
/// implementations through [`EngineBuilder::charge_gateway`].
///
/// [`EngineBuilder::charge_gateway`]: crate::EngineBuilder::charge_gateway
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoApprove;

#[async_trait]
impl ChargeGateway for AutoApprove {
    async fn charge(&self, _donation_id: Uuid, _amount_minor: i64, _currency: Currency) -> bool {
        true
    }
}
