//! Static dispatch table from request kind to handler

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::Dispatcher;
use crate::errors::DialogResult;
use crate::handlers::{
    AcquisitionHandler, BettingHandler, DiceHandler, MagicHandler, SeizureHandler, TargetPieceHandler,
    TargetZoneHandler, TaxHandler, UpgradeHandler,
};
use crate::requests::{DialogRequest, DialogResponse, RequestKind};

/// Presents one kind of dialog request and produces its answer
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(
        &self,
        dispatcher: &Dispatcher,
        request: DialogRequest,
    ) -> DialogResult<DialogResponse>;
}

/// One handler per request kind
#[derive(Clone, Default)]
pub struct HandlerTable {
    handlers: HashMap<RequestKind, Arc<dyn RequestHandler>>,
}

impl HandlerTable {
    /// Empty table; every dispatch fails until kinds are bound
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the built-in handler for every kind
    pub fn standard() -> Self {
        let mut table = Self::new();
        for kind in RequestKind::ALL {
            table.bind(kind, standard_handler(kind));
        }
        table
    }

    pub fn bind(&mut self, kind: RequestKind, handler: Arc<dyn RequestHandler>) -> &mut Self {
        self.handlers.insert(kind, handler);
        self
    }

    pub fn get(&self, kind: RequestKind) -> Option<Arc<dyn RequestHandler>> {
        self.handlers.get(&kind).cloned()
    }

    pub fn is_bound(&self, kind: RequestKind) -> bool {
        self.handlers.contains_key(&kind)
    }
}

fn standard_handler(kind: RequestKind) -> Arc<dyn RequestHandler> {
    match kind {
        RequestKind::Dice => Arc::new(DiceHandler),
        RequestKind::Upgrade => Arc::new(UpgradeHandler),
        RequestKind::Acquisition => Arc::new(AcquisitionHandler),
        RequestKind::Seizure => Arc::new(SeizureHandler),
        RequestKind::Betting => Arc::new(BettingHandler),
        RequestKind::Tax => Arc::new(TaxHandler),
        RequestKind::TargetZone => Arc::new(TargetZoneHandler),
        RequestKind::TargetPiece => Arc::new(TargetPieceHandler),
        RequestKind::Magic => Arc::new(MagicHandler),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_binds_every_kind() {
        let table = HandlerTable::standard();
        for kind in RequestKind::ALL {
            assert!(table.is_bound(kind), "{kind} unbound");
        }
        assert!(!HandlerTable::new().is_bound(RequestKind::Dice));
    }
}
