#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use tessera_ransac as ransac;

#[doc(inline)]
pub use tessera_stereo as stereo;
