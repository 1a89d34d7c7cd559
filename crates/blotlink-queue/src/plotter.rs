use std::sync::{Arc, Mutex};

use blotlink_frame::FrameEncoder;
use tracing::trace;

use crate::commands::Command;
use crate::error::Result;
use crate::queue::DeliveryQueue;

/// Command-level producer for one plotter.
///
/// Pairs the link's [`FrameEncoder`] with its [`DeliveryQueue`]. Clones share
/// both, so any number of threads can drive the same plotter. Encoding and
/// enqueueing happen under one lock, which keeps sequence numbers ascending in
/// wire order even with concurrent callers.
#[derive(Debug, Clone)]
pub struct Plotter {
    encoder: Arc<FrameEncoder>,
    queue: DeliveryQueue,
    submit: Arc<Mutex<()>>,
}

impl Plotter {
    /// Plotter with a fresh encoder starting at sequence 0.
    pub fn new(queue: DeliveryQueue) -> Self {
        Self::with_encoder(Arc::new(FrameEncoder::new()), queue)
    }

    /// Plotter that stamps frames with an existing encoder.
    pub fn with_encoder(encoder: Arc<FrameEncoder>, queue: DeliveryQueue) -> Self {
        Self {
            encoder,
            queue,
            submit: Arc::new(Mutex::new(())),
        }
    }

    /// Frame `command` and queue it for the worker.
    pub fn send(&self, command: &Command) -> Result<()> {
        let payload = command.payload();
        let _guard = self.submit.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let frame = self.encoder.encode(command.event(), &payload)?;
        trace!(%command, len = frame.len(), "queueing command");
        self.queue.push(frame)
    }

    /// Queue every command in order.
    pub fn send_all<'a>(&self, commands: impl IntoIterator<Item = &'a Command>) -> Result<usize> {
        let mut sent = 0usize;
        for command in commands {
            self.send(command)?;
            sent += 1;
        }
        Ok(sent)
    }

    pub fn go(&self, x: f32, y: f32) -> Result<()> {
        self.send(&Command::go(x, y))
    }

    pub fn pen_up(&self) -> Result<()> {
        self.send(&Command::pen_up())
    }

    pub fn pen_down(&self) -> Result<()> {
        self.send(&Command::pen_down())
    }

    pub fn motors_on(&self) -> Result<()> {
        self.send(&Command::MotorsOn)
    }

    pub fn motors_off(&self) -> Result<()> {
        self.send(&Command::MotorsOff)
    }

    /// Send the firmware `shutdown` event. Unlike [`Plotter::close`], the
    /// worker keeps running afterwards.
    pub fn send_shutdown_event(&self) -> Result<()> {
        self.send(&Command::Shutdown)
    }

    /// Queue the square demo: motors on, pen down, trace the four corners from
    /// the origin, pen up, motors off.
    pub fn draw_square(&self, size: f32) -> Result<()> {
        self.send_all(&square_commands(size)).map(|_| ())
    }

    /// The sequence number the next command will carry.
    pub fn next_sequence(&self) -> u8 {
        self.encoder.next_sequence()
    }

    /// Producer handle for raw frames.
    pub fn queue(&self) -> &DeliveryQueue {
        &self.queue
    }

    /// Stop the worker after everything queued so far has been written.
    pub fn close(&self) {
        self.queue.shutdown();
    }
}

/// Commands that draw a `size` × `size` square anchored at the origin.
pub fn square_commands(size: f32) -> Vec<Command> {
    vec![
        Command::MotorsOn,
        Command::pen_down(),
        Command::go(0.0, size),
        Command::go(size, size),
        Command::go(size, 0.0),
        Command::go(0.0, 0.0),
        Command::pen_up(),
        Command::MotorsOff,
    ]
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use blotlink_frame::{encode_frame, FrameReader, RawFrame};

    use super::*;
    use crate::queue::WorkerState;
    use crate::worker::spawn;

    fn decode_all(wire: &[u8]) -> Vec<RawFrame> {
        FrameReader::new(wire).map(|frame| frame.unwrap()).collect()
    }

    #[test]
    fn commands_reach_the_wire_in_order() {
        let (queue, handle) = spawn(Vec::new()).unwrap();
        let plotter = Plotter::new(queue);

        plotter.motors_on().unwrap();
        plotter.go(10.0, 20.0).unwrap();
        plotter.pen_down().unwrap();
        plotter.motors_off().unwrap();
        plotter.close();

        let frames = decode_all(&handle.join().unwrap().sink);
        let summary: Vec<(&str, u8)> = frames
            .iter()
            .map(|f| (f.event.as_str(), f.sequence))
            .collect();
        assert_eq!(
            summary,
            vec![("motorsOn", 0), ("go", 1), ("servo", 2), ("motorsOff", 3)]
        );
        assert_eq!(frames[1].payload, Command::go(10.0, 20.0).payload());
        assert_eq!(frames[2].payload.as_ref(), &2500i32.to_le_bytes());
    }

    #[test]
    fn square_demo_frames() {
        let (queue, handle) = spawn(Vec::new()).unwrap();
        let plotter = Plotter::new(queue);
        plotter.draw_square(50.0).unwrap();
        plotter.close();

        let frames = decode_all(&handle.join().unwrap().sink);
        let events: Vec<&str> = frames.iter().map(|f| f.event.as_str()).collect();
        assert_eq!(
            events,
            vec!["motorsOn", "servo", "go", "go", "go", "go", "servo", "motorsOff"]
        );
        assert_eq!(frames[3].payload, Command::go(50.0, 50.0).payload());
    }

    #[test]
    fn clones_share_sequence_and_keep_wire_order() {
        let (queue, handle) = spawn(Vec::new()).unwrap();
        let plotter = Plotter::new(queue);

        let threads: Vec<_> = (0..4)
            .map(|i| {
                let plotter = plotter.clone();
                std::thread::spawn(move || {
                    for _ in 0..40 {
                        plotter.go(i as f32, 0.0).unwrap();
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }
        assert_eq!(plotter.next_sequence(), 160);
        plotter.close();

        let frames = decode_all(&handle.join().unwrap().sink);
        let seqs: Vec<u8> = frames.iter().map(|f| f.sequence).collect();
        let expected: Vec<u8> = (0..160).collect();
        assert_eq!(seqs, expected);
    }

    #[test]
    fn oversized_raw_command_is_rejected() {
        let (queue, handle) = spawn(Vec::new()).unwrap();
        let plotter = Plotter::new(queue);

        let err = plotter
            .send(&Command::Raw {
                event: "blob".to_string(),
                payload: vec![0u8; 300].into(),
            })
            .unwrap_err();
        assert!(matches!(err, crate::QueueError::Framing(_)));
        assert_eq!(plotter.next_sequence(), 0);

        plotter.close();
        assert_eq!(handle.join().unwrap().frames_written, 0);
    }

    #[test]
    fn send_after_close_reports_closed() {
        let (queue, handle) = spawn(Vec::new()).unwrap();
        let plotter = Plotter::new(queue);
        plotter.close();
        handle.join().unwrap();

        assert!(matches!(
            plotter.motors_on(),
            Err(crate::QueueError::Closed)
        ));
    }

    #[test]
    fn shutdown_event_keeps_worker_running() {
        let (queue, handle) = spawn(Vec::new()).unwrap();
        let plotter = Plotter::new(queue);

        plotter.send_shutdown_event().unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while plotter.queue().pending() > 0 || handle.state() != WorkerState::Running {
            assert!(Instant::now() < deadline, "shutdown event never written");
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(!handle.is_finished());

        plotter.motors_off().unwrap();
        plotter.close();

        let frames = decode_all(&handle.join().unwrap().sink);
        assert_eq!(frames.len(), 2);
        assert_eq!((frames[0].event.as_str(), frames[0].sequence), ("shutdown", 0));
        assert!(frames[0].payload.is_empty());
        assert_eq!((frames[1].event.as_str(), frames[1].sequence), ("motorsOff", 1));
    }

    #[test]
    fn queue_accepts_preencoded_frames_between_commands() {
        let (queue, handle) = spawn(Vec::new()).unwrap();
        let plotter = Plotter::new(queue);

        plotter.motors_on().unwrap();
        let frame = encode_frame("led", &[1], 200).unwrap();
        plotter.queue().push(frame).unwrap();
        plotter.motors_off().unwrap();
        plotter.close();

        let frames = decode_all(&handle.join().unwrap().sink);
        let summary: Vec<(&str, u8)> = frames
            .iter()
            .map(|f| (f.event.as_str(), f.sequence))
            .collect();
        assert_eq!(summary, vec![("motorsOn", 0), ("led", 200), ("motorsOff", 1)]);
    }

    #[test]
    fn square_commands_shape() {
        let cmds = square_commands(20.0);
        assert_eq!(cmds.len(), 8);
        assert_eq!(cmds[2], Command::go(0.0, 20.0));
        assert_eq!(cmds[5], Command::go(0.0, 0.0));
    }
}
