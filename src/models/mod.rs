//! Concrete models built on the kernel's public contract.
//!
//! Each model supplies a configuration record, a state record where it
//! needs one, its event types, and a `build` function returning a kernel
//! ready for `setup().run()`.

pub mod beep;
pub mod counter;
pub mod decay;
pub mod producer_consumer;
