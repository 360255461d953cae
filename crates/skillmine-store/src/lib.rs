// NOTE: Storage Design Rationale
//
// Why one file per relation (not one database)?
// - Phases communicate only via persisted relations; any phase can be re-run
//   given the prior phase's files on disk
// - A missing prerequisite maps 1:1 to a missing file, so error messages can
//   name exactly what to run first
// - Re-runs atomically replace whole relations; nothing is updated in place
//
// Why Arrow IPC (Feather v2)?
// - Columnar, typed, and readable from the wider data ecosystem without a
//   bespoke loader
// - List-valued fields are stored as JSON-encoded strings and the session
//   tool sequence as a pipe-joined string, keeping every relation a flat
//   table of primitive columns

mod ipc;
mod relations;
mod store;

pub use store::RelationStore;
