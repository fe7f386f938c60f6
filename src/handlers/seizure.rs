//! Seizure dialog: toggle properties to sell until the debt is covered
//!
//! Every add re-checks `balance + selected assets >= required` and confirms
//! on its own the moment the threshold is reached. The board trigger and the
//! timeout both swap the running selection for the precomputed default.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info};

use super::mismatched;
use crate::DIALOG_TARGET;
use crate::dispatcher::{Dispatcher, RequestHandler};
use crate::errors::{DialogError, DialogResult};
use crate::events::DisposeReason;
use crate::polling::{Poll, poll_until};
use crate::requests::{DialogRequest, DialogResponse, RequestKind, SeizureRequest};
use crate::session::{SessionBuilder, Trigger};
use crate::value_objects::{GameMessage, PropertyRef, Region, ZoneId};

/// Built-in seizure handler
pub struct SeizureHandler;

#[async_trait]
impl RequestHandler for SeizureHandler {
    async fn handle(
        &self,
        dispatcher: &Dispatcher,
        request: DialogRequest,
    ) -> DialogResult<DialogResponse> {
        let actual = request.kind();
        let DialogRequest::Seizure(request) = request else {
            return Err(mismatched(RequestKind::Seizure, actual));
        };
        select_seizure(dispatcher, request)
            .await
            .map(DialogResponse::Seizure)
    }
}

/// Running selection shared between the triggers, the timeout and the
/// feedback loop
#[derive(Clone, Default)]
struct Selection {
    chosen: Arc<Mutex<Vec<PropertyRef>>>,
    confirmed: Arc<AtomicBool>,
}

impl Selection {
    fn contains(&self, zone: ZoneId) -> bool {
        self.chosen.lock().iter().any(|p| p.zone == zone)
    }

    fn assets(&self) -> i64 {
        self.chosen.lock().iter().map(|p| p.assets).sum()
    }

    /// Add or remove `property`; returns the selected assets after an add,
    /// `None` after a removal
    fn toggle(&self, property: &PropertyRef) -> Option<i64> {
        let mut chosen = self.chosen.lock();
        match chosen.iter().position(|p| p.zone == property.zone) {
            Some(index) => {
                chosen.remove(index);
                None
            }
            None => {
                chosen.push(property.clone());
                Some(chosen.iter().map(|p| p.assets).sum())
            }
        }
    }

    fn replace_with(&self, properties: &[PropertyRef]) {
        let mut chosen = self.chosen.lock();
        chosen.clear();
        chosen.extend_from_slice(properties);
    }

    fn confirm(&self) {
        self.confirmed.store(true, Ordering::SeqCst);
    }

    fn is_confirmed(&self) -> bool {
        self.confirmed.load(Ordering::SeqCst)
    }

    fn zones(&self) -> Vec<ZoneId> {
        self.chosen.lock().iter().map(|p| p.zone).collect()
    }
}

/// Run the seizure dialog and return the zones of the properties to sell
pub async fn select_seizure(
    dispatcher: &Dispatcher,
    request: SeizureRequest,
) -> DialogResult<Vec<ZoneId>> {
    let defaults = request
        .default_selection
        .iter()
        .map(|zone| {
            request
                .properties
                .iter()
                .find(|p| p.zone == *zone)
                .cloned()
                .ok_or_else(|| {
                    DialogError::invalid(RequestKind::Seizure, "default selection names a property the piece does not own")
                })
        })
        .collect::<DialogResult<Vec<_>>>()?;
    let defaults = Arc::new(defaults);

    let world = dispatcher.world();
    let config = dispatcher.config();
    let piece = request.piece.id;
    let balance = request.balance;
    let required = request.required;
    let selection = Selection::default();

    let mut builder = SessionBuilder::new(RequestKind::Seizure, piece)
        .message(GameMessage::Seizure.prompt())
        .action_message({
            let selection = selection.clone();
            move || format!("needed cost {}/{}", balance + selection.assets(), required)
        });

    for property in &request.properties {
        let region = Region::Zone(property.zone);
        let trigger = {
            let selection = selection.clone();
            let property = property.clone();
            Trigger::new(region, move |hit| {
                let Some(assets) = selection.toggle(&property) else {
                    debug!(target: DIALOG_TARGET, zone = ?property.zone, "property deselected");
                    return;
                };
                if balance + assets >= required {
                    selection.confirm();
                    hit.session.dispose(DisposeReason::Answered);
                }
            })
        };
        let label = {
            let selection = selection.clone();
            let property = property.clone();
            move || {
                if selection.contains(property.zone) {
                    format!("{} cancel choice -{}", property.name, property.assets)
                } else {
                    format!("{} confirm +{}", property.name, property.assets)
                }
            }
        };
        builder = builder.trigger(
            trigger
                .label(label)
                .display(format!("sale amount: {}", property.assets)),
        );
    }

    let auto_label = {
        let names: Vec<&str> = defaults.iter().map(|p| p.name.as_str()).collect();
        let total: i64 = defaults.iter().map(|p| p.assets).sum();
        format!("auto choose({}) +{}", names.join(", "), total)
    };
    let session = dispatcher.open(
        builder
            .trigger(
                Trigger::new(Region::Board, {
                    let selection = selection.clone();
                    let defaults = defaults.clone();
                    move |hit| {
                        selection.replace_with(&defaults);
                        selection.confirm();
                        hit.session.dispose(DisposeReason::Answered);
                    }
                })
                .label(move || auto_label.clone()),
            )
            .timeout(GameMessage::Seizure.label(), config.seizure_timeout(), {
                let selection = selection.clone();
                let defaults = defaults.clone();
                move |_| {
                    selection.replace_with(&defaults);
                    selection.confirm();
                }
            }),
    );

    poll_until(config.tick(), || {
        if selection.is_confirmed() || session.is_disposed() {
            return Poll::Done;
        }
        if world.agent_of(piece).is_none() {
            info!(target: DIALOG_TARGET, "no live agent, selling the default properties");
            selection.replace_with(&defaults);
            selection.confirm();
            session.dispose(DisposeReason::Completed);
            return Poll::Done;
        }
        for property in &request.properties {
            world.show_selection(property.zone, selection.contains(property.zone));
        }
        Poll::Continue
    })
    .await;

    if !selection.is_confirmed() {
        return Err(DialogError::Superseded {
            kind: RequestKind::Seizure,
        });
    }
    Ok(selection.zones())
}
