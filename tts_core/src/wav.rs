use bytes::Bytes;

/// Size of the canonical RIFF/WAVE/fmt/data header.
pub const WAV_HEADER_LEN: usize = 44;

/// Placeholder written into the size fields when the stream length is not
/// known yet. The RIFF size then reads `36 + STREAMING_DATA_SIZE`, which does
/// not match the real stream; players tolerate it, strict validators will not.
pub const STREAMING_DATA_SIZE: u32 = 99_999_999;

/// PCM layout of one audio stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_depth: u16,
}

impl AudioFormat {
    /// 24 kHz, mono, 16-bit little-endian: what the Gemini TTS models emit.
    pub const GEMINI_TTS: AudioFormat = AudioFormat {
        sample_rate: 24_000,
        channels: 1,
        bit_depth: 16,
    };

    /// Wraps on overflow, like the RIFF size field.
    pub fn block_align(&self) -> u16 {
        self.channels.wrapping_mul(self.bit_depth / 8)
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate.wrapping_mul(u32::from(self.block_align()))
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::GEMINI_TTS
    }
}

/// Value of the `data` chunk size field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSize {
    /// The caller knows how many PCM bytes follow.
    Exact(u32),
    /// Length unknown at write time, see [`STREAMING_DATA_SIZE`].
    Streaming,
}

impl DataSize {
    pub fn declared(self) -> u32 {
        match self {
            DataSize::Exact(n) => n,
            DataSize::Streaming => STREAMING_DATA_SIZE,
        }
    }
}

/// Build the 44-byte WAV header for `format` declaring `size` bytes of PCM.
pub fn wav_header(format: AudioFormat, size: DataSize) -> [u8; WAV_HEADER_LEN] {
    let data_size = size.declared();
    let riff_size = data_size.wrapping_add(36);

    let mut out = [0u8; WAV_HEADER_LEN];
    let mut pos = 0;
    let mut put = |bytes: &[u8]| {
        out[pos..pos + bytes.len()].copy_from_slice(bytes);
        pos += bytes.len();
    };

    // RIFF header
    put(b"RIFF");
    put(&riff_size.to_le_bytes());
    put(b"WAVE");

    // fmt chunk
    put(b"fmt ");
    put(&16u32.to_le_bytes()); // fmt chunk size
    put(&1u16.to_le_bytes()); // PCM
    put(&format.channels.to_le_bytes());
    put(&format.sample_rate.to_le_bytes());
    put(&format.byte_rate().to_le_bytes());
    put(&format.block_align().to_le_bytes());
    put(&format.bit_depth.to_le_bytes());

    // data chunk
    put(b"data");
    put(&data_size.to_le_bytes());

    out
}

/// Header for a stream whose final length is unknown.
pub fn streaming_header(format: AudioFormat) -> Bytes {
    Bytes::copy_from_slice(&wav_header(format, DataSize::Streaming))
}

/// Wrap a complete PCM buffer into a strictly valid WAV file.
pub fn pcm_to_wav(pcm: &[u8], format: AudioFormat) -> anyhow::Result<Vec<u8>> {
    let data_size = u32::try_from(pcm.len())
        .map_err(|_| anyhow::anyhow!("PCM buffer of {} bytes exceeds the WAV size limit", pcm.len()))?;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());
    out.extend_from_slice(&wav_header(format, DataSize::Exact(data_size)));
    out.extend_from_slice(pcm);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn u16_at(h: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([h[at], h[at + 1]])
    }

    fn u32_at(h: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([h[at], h[at + 1], h[at + 2], h[at + 3]])
    }

    #[test]
    fn header_fields_decode_little_endian() {
        let cases = [
            (AudioFormat::GEMINI_TTS, 0u32),
            (AudioFormat { sample_rate: 44_100, channels: 2, bit_depth: 16 }, 17_640),
            (AudioFormat { sample_rate: 48_000, channels: 2, bit_depth: 24 }, 1),
            (AudioFormat { sample_rate: 8_000, channels: 1, bit_depth: 8 }, u32::MAX - 36),
        ];

        for (format, n) in cases {
            let h = wav_header(format, DataSize::Exact(n));
            assert_eq!(h.len(), 44);
            assert_eq!(&h[0..4], b"RIFF");
            assert_eq!(u32_at(&h, 4), 36 + n);
            assert_eq!(&h[8..12], b"WAVE");
            assert_eq!(&h[12..16], b"fmt ");
            assert_eq!(u32_at(&h, 16), 16);
            assert_eq!(u16_at(&h, 20), 1);
            assert_eq!(u16_at(&h, 22), format.channels);
            assert_eq!(u32_at(&h, 24), format.sample_rate);
            assert_eq!(
                u32_at(&h, 28),
                format.sample_rate * format.channels as u32 * (format.bit_depth as u32 / 8)
            );
            assert_eq!(u16_at(&h, 32), format.channels * (format.bit_depth / 8));
            assert_eq!(u16_at(&h, 34), format.bit_depth);
            assert_eq!(&h[36..40], b"data");
            assert_eq!(u32_at(&h, 40), n);
        }
    }

    #[test]
    fn gemini_format_rates() {
        let format = AudioFormat::GEMINI_TTS;
        assert_eq!(format.byte_rate(), 48_000);
        assert_eq!(format.block_align(), 2);
    }

    #[test]
    fn streaming_header_declares_placeholder() {
        let h = streaming_header(AudioFormat::GEMINI_TTS);
        assert_eq!(h.len(), WAV_HEADER_LEN);
        assert_eq!(u32_at(&h, 4), 100_000_035);
        assert_eq!(u32_at(&h, 40), STREAMING_DATA_SIZE);
        assert_eq!(&h[8..36], &wav_header(AudioFormat::GEMINI_TTS, DataSize::Exact(0))[8..36]);
    }

    #[test]
    fn oversized_formats_wrap_instead_of_panicking() {
        let format = AudioFormat { sample_rate: 3_000_000_000, channels: 1, bit_depth: 16 };
        let h = wav_header(format, DataSize::Exact(0));
        assert_eq!(u32_at(&h, 24), 3_000_000_000);
        assert_eq!(u32_at(&h, 28), 3_000_000_000u32.wrapping_mul(2));

        let format = AudioFormat { sample_rate: u32::MAX, channels: u16::MAX, bit_depth: 32 };
        let h = wav_header(format, DataSize::Streaming);
        assert_eq!(u16_at(&h, 22), u16::MAX);
        assert_eq!(u16_at(&h, 32), u16::MAX.wrapping_mul(4));
        assert_eq!(u32_at(&h, 28), u32::MAX.wrapping_mul(u32::from(u16::MAX.wrapping_mul(4))));
        assert_eq!(u32_at(&h, 40), STREAMING_DATA_SIZE);
    }

    #[test]
    fn exact_mode_file_parses_with_hound() {
        let samples: Vec<i16> = (0..480).map(|i| (i * 37 % 2000) as i16 - 1000).collect();
        let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        let wav = pcm_to_wav(&pcm, AudioFormat::GEMINI_TTS).unwrap();
        assert_eq!(wav.len(), 44 + pcm.len());

        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 24_000);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);
        assert_eq!(reader.len() as usize * 2, pcm.len());

        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn exact_mode_empty_pcm_is_header_only() {
        let wav = pcm_to_wav(&[], AudioFormat::GEMINI_TTS).unwrap();
        assert_eq!(wav.len(), 44);
        assert_eq!(u32_at(&wav, 40), 0);
    }
}
