mod intake;
mod wizard;

pub use intake::*;
pub use wizard::WizardStep;
