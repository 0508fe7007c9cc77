// Fixed-length chunk assembly
//
// Frames arrive in whatever sizes the backend produces. The assembler
// copies them into an accumulation buffer and hands back every chunk that
// becomes completely full. A frame that straddles a boundary is split, so
// each sample lands in exactly one chunk.

/// Accumulates interleaved samples into fixed-length chunks
#[derive(Debug)]
pub struct ChunkAssembler {
    chunk_len: usize,
    buffer: Vec<i16>,
}

impl ChunkAssembler {
    /// Create an assembler producing chunks of `chunk_len` samples.
    ///
    /// A zero length is clamped to one sample.
    pub fn new(chunk_len: usize) -> Self {
        let chunk_len = chunk_len.max(1);
        Self {
            chunk_len,
            buffer: Vec::with_capacity(chunk_len),
        }
    }

    /// Number of samples in a complete chunk
    pub fn chunk_len(&self) -> usize {
        self.chunk_len
    }

    /// Append samples, returning the chunks completed by this push in order
    pub fn push(&mut self, mut samples: &[i16]) -> Vec<Vec<i16>> {
        let mut completed = Vec::new();

        while !samples.is_empty() {
            let room = self.chunk_len - self.buffer.len();
            let take = room.min(samples.len());

            self.buffer.extend_from_slice(&samples[..take]);
            samples = &samples[take..];

            if self.buffer.len() == self.chunk_len {
                let full = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.chunk_len));
                completed.push(full);
            }
        }

        completed
    }

    /// Samples of the chunk currently being assembled
    pub fn pending(&self) -> &[i16] {
        &self.buffer
    }

    /// Drop the partially assembled chunk, returning how many samples were discarded
    pub fn discard_pending(&mut self) -> usize {
        let dropped = self.buffer.len();
        self.buffer.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_fill_emits_one_chunk() {
        let mut assembler = ChunkAssembler::new(4);
        assert!(assembler.push(&[1, 2]).is_empty());
        let chunks = assembler.push(&[3, 4]);

        assert_eq!(chunks, vec![vec![1, 2, 3, 4]]);
        assert!(assembler.pending().is_empty());
    }

    #[test]
    fn test_frame_straddling_boundary_is_split() {
        let mut assembler = ChunkAssembler::new(3);
        let chunks = assembler.push(&[1, 2, 3, 4, 5]);

        assert_eq!(chunks, vec![vec![1, 2, 3]]);
        assert_eq!(assembler.pending(), &[4, 5]);

        let chunks = assembler.push(&[6, 7, 8, 9, 10, 11, 12]);
        assert_eq!(chunks, vec![vec![4, 5, 6], vec![7, 8, 9], vec![10, 11, 12]]);
        assert!(assembler.pending().is_empty());
    }

    #[test]
    fn test_every_sample_lands_once_in_order() {
        let mut assembler = ChunkAssembler::new(7);
        let input: Vec<i16> = (0..100).collect();

        let mut out = Vec::new();
        for frame in input.chunks(5) {
            for chunk in assembler.push(frame) {
                assert_eq!(chunk.len(), 7);
                out.extend(chunk);
            }
        }
        out.extend_from_slice(assembler.pending());

        assert_eq!(out, input);
    }

    #[test]
    fn test_discard_pending() {
        let mut assembler = ChunkAssembler::new(10);
        assembler.push(&[1; 7]);

        assert_eq!(assembler.discard_pending(), 7);
        assert!(assembler.pending().is_empty());
        assert_eq!(assembler.push(&[2; 10]), vec![vec![2; 10]]);
    }

    #[test]
    fn test_zero_length_clamped() {
        let mut assembler = ChunkAssembler::new(0);
        assert_eq!(assembler.chunk_len(), 1);
        assert_eq!(assembler.push(&[5, 6]).len(), 2);
    }
}
