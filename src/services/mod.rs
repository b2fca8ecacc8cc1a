pub(crate) mod access_policy;
pub(crate) mod authoring;
pub(crate) mod progress;
pub(crate) mod quiz_scoring;
pub(crate) mod video_embed;
