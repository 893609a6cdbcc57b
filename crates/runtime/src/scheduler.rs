use crate::frame::Frame;
use crate::job::Job;

/// Next-paint job queue.
///
/// Jobs deferred while frame `n` is current are handed out when frame `n + 1`
/// begins, so DOM inserted during frame `n` exists before widgets attach.
/// Jobs deferred while a frame's batch is running wait for the frame after.
pub struct Scheduler<T> {
    frame: Frame,
    next_order: u64,
    pending: Vec<(u64, Job<T>)>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            frame: Frame::default(),
            next_order: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn defer(&mut self, job: Job<T>) {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);
        self.pending.push((order, job));
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Advances to the next frame and returns the jobs due in it.
    ///
    /// Ordering is deterministic: `(priority, id, insertion_order)`.
    pub fn begin_frame(&mut self) -> (Frame, Vec<Job<T>>) {
        self.frame = self.frame.next();
        let mut due = std::mem::take(&mut self.pending);
        due.sort_by(|(oa, a), (ob, b)| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.id.cmp(b.id))
                .then_with(|| oa.cmp(ob))
        });
        (self.frame, due.into_iter().map(|(_, job)| job).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::Scheduler;
    use crate::job::Job;
    use crate::navigation::NavigationClock;

    #[test]
    fn deferred_jobs_run_on_next_frame_only() {
        let clock = NavigationClock::new();
        let token = clock.advance();
        let mut sched = Scheduler::new();
        sched.defer(Job::new("a", token, 1));
        assert_eq!(sched.pending_count(), 1);

        let (frame, due) = sched.begin_frame();
        assert_eq!(frame.index, 1);
        assert_eq!(due.len(), 1);

        let (_, due) = sched.begin_frame();
        assert!(due.is_empty());
    }

    #[test]
    fn runs_higher_priority_then_id_then_insertion() {
        let token = NavigationClock::new().advance();
        let mut sched = Scheduler::new();
        sched.defer(Job::with_priority("b", 0, token, "b"));
        sched.defer(Job::with_priority("a", 0, token, "a1"));
        sched.defer(Job::with_priority("z", -1, token, "z"));
        sched.defer(Job::with_priority("a", 0, token, "a2"));

        let (_, due) = sched.begin_frame();
        let order: Vec<_> = due.iter().map(|j| j.task).collect();
        assert_eq!(order, vec!["z", "a1", "a2", "b"]);
    }
}
