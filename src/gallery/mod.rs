//! Window- and GPU-independent gallery logic.

pub mod animation;
pub mod audio;
pub mod controller;
pub mod effect;
pub mod layout;
pub mod lightbox;
pub mod picking;
pub mod registry;

pub use animation::AnimationDriver;
pub use audio::{AudioGate, BackgroundTrack, GateOutcome};
pub use controller::{GalleryController, GalleryEvent, Key};
pub use effect::Effect;
pub use lightbox::{DismissTrigger, Lightbox, LightboxState, OverlaySpec};
pub use picking::{PickOutcome, Picker, PointerSample, ViewportRect};
pub use registry::{GalleryScene, InteractiveObject};
