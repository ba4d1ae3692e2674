//! Per-region audio sinks.

use crate::ClipHandle;

/// Host audio output for one region.
///
/// A sink asked to play before it has a clip must stay silent and start as
/// soon as [`set_clip`](AudioSink::set_clip) delivers one.
pub trait AudioSink {
    /// Request playback.
    fn play(&mut self);
    /// Stop playback.
    fn stop(&mut self);
    /// Whether audio is actually coming out.
    fn is_playing(&self) -> bool;
    /// Whether a clip is attached.
    fn has_clip(&self) -> bool;
    /// Attach a clip, replacing any previous one.
    fn set_clip(&mut self, clip: ClipHandle);
}

/// Sink that produces no audio but tracks requests.
///
/// Useful for tests or headless operation.
#[derive(Debug, Default)]
pub struct NullSink {
    clip: Option<ClipHandle>,
    requested: bool,
}

impl NullSink {
    /// Create an idle sink with no clip.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attached clip, if any.
    pub fn clip(&self) -> Option<&ClipHandle> {
        self.clip.as_ref()
    }

    /// Whether `play()` is outstanding.
    pub fn is_requested(&self) -> bool {
        self.requested
    }
}

impl AudioSink for NullSink {
    fn play(&mut self) {
        self.requested = true;
    }

    fn stop(&mut self) {
        self.requested = false;
    }

    fn is_playing(&self) -> bool {
        self.requested && self.clip.is_some()
    }

    fn has_clip(&self) -> bool {
        self.clip.is_some()
    }

    fn set_clip(&mut self, clip: ClipHandle) {
        self.clip = Some(clip);
    }
}

#[cfg(feature = "rodio_backend")]
pub mod rodio_backend {
    //! Real output through rodio.

    use super::AudioSink;
    use crate::{ClipData, ClipHandle};
    use rodio::buffer::SamplesBuffer;
    use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
    use std::io;
    use tracing::{debug, warn};

    /// Output device. Must outlive every sink created from it.
    pub struct RodioOutput {
        _stream: OutputStream,
        handle: OutputStreamHandle,
    }

    impl RodioOutput {
        /// Open the default output device.
        pub fn open_default() -> io::Result<Self> {
            let (stream, handle) = OutputStream::try_default()
                .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
            Ok(Self {
                _stream: stream,
                handle,
            })
        }

        /// New sink bound to this device.
        pub fn sink(&self) -> RodioSink {
            RodioSink {
                handle: self.handle.clone(),
                sink: None,
                clip: None,
                requested: false,
            }
        }
    }

    /// Region sink backed by a rodio `Sink`.
    pub struct RodioSink {
        handle: OutputStreamHandle,
        sink: Option<Sink>,
        clip: Option<ClipHandle>,
        requested: bool,
    }

    impl RodioSink {
        fn start(&mut self) {
            let Some(clip) = &self.clip else {
                return;
            };
            let buffer = match clip.data() {
                ClipData::Pcm(buffer) => buffer,
                ClipData::Builtin { track } => {
                    warn!(track = %track, "Builtin tracks are not available on the rodio backend");
                    return;
                }
            };
            let sink = match Sink::try_new(&self.handle) {
                Ok(sink) => sink,
                Err(err) => {
                    warn!("Failed to create audio sink: {err}");
                    return;
                }
            };
            let source = SamplesBuffer::new(
                buffer.channels,
                buffer.sample_rate,
                buffer.samples.clone(),
            );
            if clip.is_looping() {
                sink.append(source.repeat_infinite());
            } else {
                sink.append(source);
            }
            debug!(clip = clip.label(), "Started region music");
            self.sink = Some(sink);
        }
    }

    impl AudioSink for RodioSink {
        fn play(&mut self) {
            self.requested = true;
            if self.sink.is_none() {
                self.start();
            }
        }

        fn stop(&mut self) {
            self.requested = false;
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
        }

        fn is_playing(&self) -> bool {
            self.sink
                .as_ref()
                .map(|s| !s.empty() && !s.is_paused())
                .unwrap_or(false)
        }

        fn has_clip(&self) -> bool {
            self.clip.is_some()
        }

        fn set_clip(&mut self, clip: ClipHandle) {
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
            self.clip = Some(clip);
            if self.requested {
                self.start();
            }
        }
    }
}
