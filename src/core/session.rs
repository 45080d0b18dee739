//! Terminal session handles
//!
//! One session per UI instance: the buffer showing the terminal, the input
//! stream of the running job, and the process id of the shell. Handles go
//! stale when the buffer is closed by the host, so liveness is re-checked
//! against the editor before every use.

use crate::host::{BufferId, Editor, JobId, TermHandles, UNSET_BUFFER};

/// Handles of one terminal buffer and its process
#[derive(Clone, Copy, Debug)]
pub struct Session {
    buffer: BufferId,
    job: Option<JobId>,
    pid: Option<u32>,
}

impl Session {
    /// A session with no terminal created yet
    pub fn new() -> Self {
        Self {
            buffer: UNSET_BUFFER,
            job: None,
            pid: None,
        }
    }

    /// Adopt the handles captured by a back end
    pub fn attach(&mut self, handles: TermHandles) {
        self.buffer = handles.buffer;
        self.job = handles.job;
        self.pid = handles.pid;
    }

    /// Whether the stored buffer handle still refers to a live buffer
    pub fn is_attached(&self, editor: &dyn Editor) -> bool {
        self.buffer != UNSET_BUFFER && editor.buffer_exists(self.buffer)
    }

    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    pub fn job(&self) -> Option<JobId> {
        self.job
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
