//! Scripted in-memory host for tests
//!
//! `FakeEditor` implements [`Editor`] over a flat buffer/window model and
//! records every mutating call so tests can assert on what reached the
//! host and in which order.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::rc::Rc;

use crate::core::cwd::CwdProbe;
use crate::host::{
    BufferId, Choice, CursorPos, Editor, HostError, JobId, Mode, OptionSet, SpawnOptions, TabId,
    WindowId, WindowLayout,
};

pub(crate) struct FakeEditor {
    buffers: HashMap<BufferId, Vec<String>>,
    next_buffer: BufferId,
    windows: HashMap<WindowId, BufferId>,
    current_window: WindowId,
    current_tab: TabId,
    cursor: CursorPos,
    mode: Mode,
    current_dir: PathBuf,
    features: HashSet<String>,
    confirm_queue: VecDeque<Choice>,

    // Job state
    jobs: HashSet<JobId>,
    next_job: JobId,
    buffer_jobs: HashMap<BufferId, (JobId, u32)>,

    // Recorded host calls
    ops: Vec<String>,
    splits: Vec<WindowLayout>,
    spawns: Vec<(Vec<String>, PathBuf)>,
    job_input: Vec<Vec<u8>>,
    key_input: Vec<(BufferId, Vec<u8>)>,
    fed_keys: Vec<Vec<u8>>,
    waited: Vec<BufferId>,
    option_batches: Vec<(WindowId, BufferId, OptionSet)>,
    filetypes: Vec<(BufferId, String)>,
    confirms: Vec<String>,
    errors: Vec<String>,
    redraws: usize,
    insert_starts: usize,
    insert_stops: usize,
    slept_ms: u64,
}

impl FakeEditor {
    pub(crate) const SPAWNED_PID: u32 = 4321;

    pub(crate) fn new() -> Self {
        let mut buffers = HashMap::new();
        buffers.insert(1, vec![String::new()]);
        let mut windows = HashMap::new();
        windows.insert(1000, 1);

        Self {
            buffers,
            next_buffer: 2,
            windows,
            current_window: 1000,
            current_tab: 1,
            cursor: CursorPos { line: 1, col: 1 },
            mode: Mode::Normal,
            current_dir: std::env::temp_dir(),
            features: HashSet::new(),
            confirm_queue: VecDeque::new(),
            jobs: HashSet::new(),
            next_job: 7,
            buffer_jobs: HashMap::new(),
            ops: Vec::new(),
            splits: Vec::new(),
            spawns: Vec::new(),
            job_input: Vec::new(),
            key_input: Vec::new(),
            fed_keys: Vec::new(),
            waited: Vec::new(),
            option_batches: Vec::new(),
            filetypes: Vec::new(),
            confirms: Vec::new(),
            errors: Vec::new(),
            redraws: 0,
            insert_starts: 0,
            insert_stops: 0,
            slept_ms: 0,
        }
    }

    // --- scripting helpers ---

    pub(crate) fn add_buffer(&mut self, lines: &[&str]) -> BufferId {
        let buffer = self.next_buffer;
        self.next_buffer += 1;
        self.buffers
            .insert(buffer, lines.iter().map(|l| l.to_string()).collect());
        buffer
    }

    pub(crate) fn display_buffer(&mut self, buffer: BufferId) {
        self.windows.insert(self.current_window, buffer);
    }

    pub(crate) fn show_buffer_in_window(&mut self, buffer: BufferId, window: WindowId) {
        self.windows.insert(window, buffer);
    }

    pub(crate) fn close_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
        self.windows.retain(|_, displayed| *displayed != buffer);
    }

    pub(crate) fn set_buffer_lines(&mut self, buffer: BufferId, lines: &[&str]) {
        self.buffers
            .insert(buffer, lines.iter().map(|l| l.to_string()).collect());
    }

    pub(crate) fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub(crate) fn set_current_dir(&mut self, dir: PathBuf) {
        self.current_dir = dir;
    }

    pub(crate) fn enable_feature(&mut self, feature: &str) {
        self.features.insert(feature.to_string());
    }

    pub(crate) fn queue_confirm(&mut self, choice: Choice) {
        self.confirm_queue.push_back(choice);
    }

    // --- recorded state ---

    pub(crate) fn ops(&self) -> &[String] {
        &self.ops
    }

    pub(crate) fn splits(&self) -> &[WindowLayout] {
        &self.splits
    }

    pub(crate) fn spawns(&self) -> &[(Vec<String>, PathBuf)] {
        &self.spawns
    }

    pub(crate) fn job_input(&self) -> Vec<Vec<u8>> {
        self.job_input.clone()
    }

    pub(crate) fn key_input(&self) -> Vec<(BufferId, Vec<u8>)> {
        self.key_input.clone()
    }

    pub(crate) fn fed_keys(&self) -> Vec<Vec<u8>> {
        self.fed_keys.clone()
    }

    pub(crate) fn waited_for(&self, buffer: BufferId) -> bool {
        self.waited.contains(&buffer)
    }

    pub(crate) fn option_batches(&self) -> &[(WindowId, BufferId, OptionSet)] {
        &self.option_batches
    }

    pub(crate) fn filetypes(&self) -> &[(BufferId, String)] {
        &self.filetypes
    }

    pub(crate) fn confirms(&self) -> &[String] {
        &self.confirms
    }

    pub(crate) fn errors(&self) -> &[String] {
        &self.errors
    }

    pub(crate) fn redraw_count(&self) -> usize {
        self.redraws
    }

    pub(crate) fn insert_starts(&self) -> usize {
        self.insert_starts
    }

    pub(crate) fn insert_stops(&self) -> usize {
        self.insert_stops
    }

    pub(crate) fn slept_ms(&self) -> u64 {
        self.slept_ms
    }

    /// Bytes delivered to the terminal regardless of back end, in order
    pub(crate) fn all_input(&self) -> Vec<Vec<u8>> {
        let mut input = self.job_input.clone();
        input.extend(self.key_input.iter().map(|(_, bytes)| bytes.clone()));
        input
    }
}

impl Editor for FakeEditor {
    fn current_buffer(&self) -> BufferId {
        *self.windows.get(&self.current_window).unwrap_or(&1)
    }

    fn buffer_exists(&self, buffer: BufferId) -> bool {
        self.buffers.contains_key(&buffer)
    }

    fn edit_buffer(&mut self, buffer: BufferId) {
        self.ops.push(format!("edit_buffer:{buffer}"));
        self.windows.insert(self.current_window, buffer);
    }

    fn replace_with_empty_buffer(&mut self) {
        self.ops.push("replace_with_empty_buffer".to_string());
        let buffer = self.add_buffer(&[""]);
        self.windows.insert(self.current_window, buffer);
    }

    fn open_split(&mut self, layout: &WindowLayout) {
        self.ops.push("open_split".to_string());
        self.splits.push(layout.clone());
    }

    fn windows_for_buffer(&self, buffer: BufferId) -> Vec<WindowId> {
        let mut windows: Vec<WindowId> = self
            .windows
            .iter()
            .filter(|(_, displayed)| **displayed == buffer)
            .map(|(window, _)| *window)
            .collect();
        windows.sort_unstable();
        windows
    }

    fn current_window(&self) -> WindowId {
        self.current_window
    }

    fn goto_window(&mut self, window: WindowId) {
        self.ops.push(format!("goto_window:{window}"));
        self.current_window = window;
    }

    fn current_tab(&self) -> TabId {
        self.current_tab
    }

    fn line_count(&self, buffer: BufferId) -> u32 {
        self.buffers.get(&buffer).map(|l| l.len() as u32).unwrap_or(0)
    }

    fn line(&self, buffer: BufferId, nr: u32) -> String {
        if nr == 0 {
            return String::new();
        }
        self.buffers
            .get(&buffer)
            .and_then(|lines| lines.get(nr as usize - 1))
            .cloned()
            .unwrap_or_default()
    }

    fn cursor(&self) -> CursorPos {
        self.cursor
    }

    fn set_cursor(&mut self, line: u32, col: u32) {
        self.cursor = CursorPos { line, col };
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn current_dir(&self) -> PathBuf {
        self.current_dir.clone()
    }

    fn confirm(&mut self, message: &str) -> Choice {
        self.confirms.push(message.to_string());
        self.confirm_queue.pop_front().unwrap_or(Choice::Cancel)
    }

    fn report_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn has_feature(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }

    fn apply_options(&mut self, window: WindowId, buffer: BufferId, options: &OptionSet) {
        self.ops.push("apply_options".to_string());
        self.option_batches.push((window, buffer, options.clone()));
    }

    fn set_filetype(&mut self, buffer: BufferId, filetype: &str) {
        self.ops.push(format!("set_filetype:{filetype}"));
        self.filetypes.push((buffer, filetype.to_string()));
    }

    fn start_terminal_job(
        &mut self,
        command: &[String],
        options: &SpawnOptions,
    ) -> Result<JobId, HostError> {
        self.ops.push("start_terminal_job".to_string());
        self.spawns.push((command.to_vec(), options.cwd.clone()));
        let job = self.next_job;
        self.next_job += 1;
        self.jobs.insert(job);
        Ok(job)
    }

    fn terminal_job_pid(&self, job: JobId) -> Option<u32> {
        self.jobs.contains(&job).then_some(Self::SPAWNED_PID)
    }

    fn open_terminal_in_buffer(
        &mut self,
        command: &[String],
        options: &SpawnOptions,
    ) -> Result<(), HostError> {
        self.ops.push("open_terminal_in_buffer".to_string());
        self.spawns.push((command.to_vec(), options.cwd.clone()));
        let job = self.next_job;
        self.next_job += 1;
        self.jobs.insert(job);
        let buffer = self.current_buffer();
        self.buffer_jobs.insert(buffer, (job, Self::SPAWNED_PID));
        Ok(())
    }

    fn buffer_job(&self, buffer: BufferId) -> Option<JobId> {
        self.buffer_jobs.get(&buffer).map(|(job, _)| *job)
    }

    fn buffer_job_pid(&self, buffer: BufferId) -> Option<u32> {
        self.buffer_jobs.get(&buffer).map(|(_, pid)| *pid)
    }

    fn open_terminal_window(
        &mut self,
        command: &[String],
        options: &SpawnOptions,
    ) -> Result<u32, HostError> {
        self.ops.push("open_terminal_window".to_string());
        self.spawns.push((command.to_vec(), options.cwd.clone()));
        let buffer = self.add_buffer(&[""]);
        self.windows.insert(self.current_window, buffer);
        Ok(Self::SPAWNED_PID)
    }

    fn send_to_job(&mut self, job: JobId, bytes: &[u8]) -> Result<(), HostError> {
        if !self.jobs.contains(&job) {
            return Err(HostError::Send(format!("unknown job {job}")));
        }
        self.job_input.push(bytes.to_vec());
        Ok(())
    }

    fn send_keys(&mut self, buffer: BufferId, bytes: &[u8]) -> Result<(), HostError> {
        if !self.buffer_exists(buffer) {
            return Err(HostError::NoSuchBuffer(buffer));
        }
        self.key_input.push((buffer, bytes.to_vec()));
        Ok(())
    }

    fn wait_terminal(&mut self, buffer: BufferId) {
        self.waited.push(buffer);
    }

    fn redraw(&mut self) {
        self.ops.push("redraw".to_string());
        self.redraws += 1;
    }

    fn start_insert(&mut self) {
        self.insert_starts += 1;
        self.mode = Mode::Insert;
    }

    fn stop_insert(&mut self) {
        self.insert_stops += 1;
        self.mode = Mode::Normal;
    }

    fn feed_keys(&mut self, bytes: &[u8]) {
        self.fed_keys.push(bytes.to_vec());
    }

    fn sleep_ms(&mut self, millis: u64) {
        self.slept_ms += millis;
    }
}

/// Probe whose answer tests can change mid-scenario through the shared
/// handle
pub(crate) struct SharedProbe(pub(crate) Rc<RefCell<Option<PathBuf>>>);

impl SharedProbe {
    pub(crate) fn new(response: Option<PathBuf>) -> (Self, Rc<RefCell<Option<PathBuf>>>) {
        let handle = Rc::new(RefCell::new(response));
        (Self(handle.clone()), handle)
    }
}

impl CwdProbe for SharedProbe {
    fn current_dir(&mut self, _pid: Option<u32>, _hint: &str) -> Option<PathBuf> {
        self.0.borrow_mut().clone()
    }
}
