mod debounce_timer;
pub use debounce_timer::*;
