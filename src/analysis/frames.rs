/// Overlapping, fixed-length analysis frames over a sample buffer.
///
/// Frames start every `hop_size` samples. A trailing partial frame is
/// dropped rather than zero-padded, so `len()` is also the widest image
/// the buffer can fill.
#[derive(Clone, Copy, Debug)]
pub struct FrameSource<'a> {
    samples: &'a [f32],
    fft_size: usize,
    hop_size: usize,
}

impl<'a> FrameSource<'a> {
    pub fn new(samples: &'a [f32], fft_size: usize, hop_size: usize) -> Self {
        debug_assert!(fft_size > 0, "fft_size must be positive");
        debug_assert!(hop_size > 0, "hop_size must be positive");
        Self {
            samples,
            fft_size,
            hop_size,
        }
    }

    pub fn len(&self) -> usize {
        if self.samples.len() < self.fft_size {
            return 0;
        }
        (self.samples.len() - self.fft_size) / self.hop_size + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn frame(&self, index: usize) -> Option<&'a [f32]> {
        let start = index.checked_mul(self.hop_size)?;
        let end = start.checked_add(self.fft_size)?;
        self.samples.get(start..end)
    }

    /// Iterates from the first frame; each call starts over.
    pub fn iter(&self) -> Frames<'a> {
        Frames {
            source: *self,
            next: 0,
        }
    }
}

pub struct Frames<'a> {
    source: FrameSource<'a>,
    next: usize,
}

impl<'a> Iterator for Frames<'a> {
    type Item = &'a [f32];

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.source.frame(self.next)?;
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.source.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Frames<'_> {}
