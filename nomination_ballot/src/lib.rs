/*!
A one-time ballot over a fixed list of nominations.

The crate holds the parts of the voting page that carry state or rules:

* [`catalog`]: the immutable list of nominations and their options
* [`ballot`]: the selection and submission state machine
* [`store`]: durable storage of the submitted ballot, and user notices
* [`tally`]: synthetic results, ranking and percentages
* [`countdown`]: the time left before the deadline, and its periodic ticker

```
use nomination_ballot::store::{LogNotifier, MemoryStore, VoteStore};
use nomination_ballot::Catalog;

let catalog = Catalog::builtin();
let mut store = VoteStore::new(MemoryStore::new(), LogNotifier);
let mut state = store.restore(catalog);
for nomination in catalog.nominations() {
    state = store.select_option(&state, catalog, &nomination.id, &nomination.options[0])?;
}
let state = store.submit(&state, catalog)?;
assert!(state.submitted);
# Ok::<(), nomination_ballot::BallotError>(())
```

See the [`manual`] for the storage layout and the command-line front end.
*/
mod config;

pub mod ballot;
pub mod builder;
pub mod catalog;
pub mod countdown;
pub mod manual;
pub mod store;
pub mod tally;

pub use crate::catalog::Catalog;
pub use crate::config::*;
