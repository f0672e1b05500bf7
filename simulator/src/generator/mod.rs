pub mod archive;
pub mod profile;
pub mod template;

pub use archive::SyntheticArchive;
pub use profile::InstrumentProfile;
pub use template::SkyModel;
