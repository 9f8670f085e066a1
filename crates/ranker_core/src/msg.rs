use bytes::Bytes;

use crate::{JobId, ResultsPage, ServiceError, Ticket};

/// A document picked by the user, ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Raw requirement status as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementStatusReport {
    pub status: String,
    pub title: Option<String>,
}

/// Raw batch status as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStatusReport {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User chose a requirement document (Stage A submit).
    RequirementChosen(UploadFile),
    /// User chose a candidate batch archive (Stage B submit).
    BatchChosen(UploadFile),
    /// User asked for another page of ranked results.
    PageRequested(u32),
    /// User clicked Reset / Start over.
    ResetClicked,
    /// Poll scheduler fired.
    Tick,
    /// Upload response for Stage A.
    RequirementUploaded {
        ticket: Ticket,
        result: Result<JobId, ServiceError>,
    },
    /// Upload response for Stage B.
    BatchUploaded {
        ticket: Ticket,
        result: Result<JobId, ServiceError>,
    },
    /// Status poll response for Stage A.
    RequirementPolled {
        job_id: JobId,
        result: Result<RequirementStatusReport, ServiceError>,
    },
    /// Status poll response for Stage B.
    BatchPolled {
        job_id: JobId,
        result: Result<BatchStatusReport, ServiceError>,
    },
    /// Ranked results page response.
    ResultsFetched {
        batch_id: JobId,
        page: u32,
        result: Result<ResultsPage, ServiceError>,
    },
}
