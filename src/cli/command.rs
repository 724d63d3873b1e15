use std::path::PathBuf;

/// What to sign or verify: literal text or the raw contents of a file.
#[derive(Debug, Clone)]
pub enum MessageInput {
    Text(String),
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub enum Command {
    Sign {
        key: Option<PathBuf>,
        message: MessageInput,
    },
    Verify {
        key: Option<PathBuf>,
        message: MessageInput,
        signature: String,
    },
    Fingerprint {
        key: Option<PathBuf>,
    },
}
