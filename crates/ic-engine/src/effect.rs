//! The effect reducer.
//!
//! Effects are applied in list order to a copy of the state. The copy is only
//! returned when every effect succeeded, so a failing effect never leaves the
//! caller's state partially mutated.

use ic_content::Effect;

use crate::error::{EngineError, EngineResult};
use crate::state::PlayerState;

/// Apply `effects` to a snapshot of `state` and return the new state.
pub fn apply(state: &PlayerState, effects: &[Effect]) -> EngineResult<PlayerState> {
    let mut next = state.clone();
    for effect in effects {
        apply_one(&mut next, effect)?;
    }
    Ok(next)
}

fn apply_one(state: &mut PlayerState, effect: &Effect) -> EngineResult<()> {
    match effect {
        Effect::AddItems(items) => {
            for (item, n) in items {
                let count = state.inventory.entry(item.clone()).or_insert(0);
                *count = count.saturating_add(*n);
            }
        }
        Effect::RemoveItems(items) => {
            for (item, n) in items {
                let held = state.count(item);
                let left = held
                    .checked_sub(*n)
                    .ok_or_else(|| EngineError::InventoryUnderflow {
                        item: item.clone(),
                        held,
                        requested: *n,
                    })?;
                state.inventory.insert(item.clone(), left);
            }
        }
        Effect::SetFlags(flags) => {
            state.flags.extend(flags.iter().cloned());
        }
        Effect::ClearFlags(flags) => {
            for flag in flags {
                state.flags.remove(flag);
            }
        }
        Effect::MoveTo(place_id) => {
            state.current_place_id = place_id.clone();
        }
    }
    Ok(())
}
