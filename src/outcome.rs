use serde::{Serialize, Serializer};

/// Result of a single send attempt. There is no partial state: the message
/// was either handed to the SMTP server or it was not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    Failed { error: String },
}

impl SendOutcome {
    pub fn failed(error: impl ToString) -> Self {
        SendOutcome::Failed {
            error: error.to_string(),
        }
    }

    pub fn is_sent(&self) -> bool {
        match self {
            SendOutcome::Sent => true,
            SendOutcome::Failed { .. } => false,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SendOutcome::Sent => None,
            SendOutcome::Failed { error } => Some(error.as_str()),
        }
    }
}

#[derive(Serialize)]
struct Wire<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

// {"success": true} / {"success": false, "error": "..."}
impl Serialize for SendOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Wire {
            success: self.is_sent(),
            error: self.error(),
        }
        .serialize(serializer)
    }
}
