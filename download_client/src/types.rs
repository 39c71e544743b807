use std::fmt;
use std::path::PathBuf;

/// What the backend should produce for a job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobType {
    Both,
    VideoOnly,
    AudioOnly,
}

impl JobType {
    pub const ALL: [JobType; 3] = [JobType::Both, JobType::VideoOnly, JobType::AudioOnly];

    /// Key used on the wire and on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            JobType::Both => "both",
            JobType::VideoOnly => "videoonly",
            JobType::AudioOnly => "audioonly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobType::Both => "Audio & Video",
            JobType::VideoOnly => "Video Only",
            JobType::AudioOnly => "Audio Only",
        }
    }

    /// Output extensions the backend supports for this job type.
    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            JobType::Both | JobType::VideoOnly => &["mp4"],
            JobType::AudioOnly => &["mp3"],
        }
    }

    /// First allowed extension, used whenever the type changes.
    pub fn default_extension(&self) -> &'static str {
        self.allowed_extensions()[0]
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.key() == key)
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of a completed submission.
#[derive(Debug, Clone)]
pub struct SavedFile {
    /// Filename the backend suggested, or the `download.<ext>` fallback.
    pub file_name: String,
    /// Where the payload was written.
    pub path: PathBuf,
    /// Payload size in bytes.
    pub bytes: u64,
}
