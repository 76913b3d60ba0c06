//! Dashboard core: movie record model, aggregation and the pure run state machine.
mod aggregate;
mod effect;
mod msg;
mod record;
mod state;
mod update;
mod view_model;

pub use aggregate::{aggregate, parse_rating, AggregateBucket, Aggregates};
pub use effect::Effect;
pub use msg::{Msg, RunFailure, Trigger};
pub use record::{
    normalize_year, ListReference, LocatorError, MovieRecord, ProfileLocator, NO_RATING, UNKNOWN,
};
pub use state::{AppState, RunId, RunPhase, RunProgress, FAILED_RUN_MESSAGE};
pub use update::update;
pub use view_model::{AppViewModel, MovieRowView, SummaryView};
