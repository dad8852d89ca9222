//! CRC-16 of extended protocol instructions.
//!
//! This is the station firmware's own accumulation scheme over polynomial
//! 0x8005, fed two bytes at a time with a zero word appended for even input.
//! It is not interchangeable with textbook CRC-16 variants.

const POLY: u16 = 0x8005;
const BITF: u16 = 0x8000;

/// Compute the CRC over `CMD || LEN || DATA`, big-endian.
///
/// Inputs shorter than two bytes yield `[0, 0]`.
pub fn crc16(data: &[u8]) -> [u8; 2] {
    let len = data.len();
    if len < 2 {
        return [0, 0];
    }

    let mut num = u16::from_be_bytes([data[0], data[1]]);
    if len > 2 {
        let mut i = 3;
        while i <= len + 2 {
            let mut num2 = if i < len {
                let word = u16::from_be_bytes([data[i - 1], data[i]]);
                i += 1;
                word
            } else {
                let word = if i == len {
                    u16::from(data[i - 1]) << 8
                } else {
                    0
                };
                i += 2;
                word
            };

            for _ in 0..16 {
                let carry = num & BITF != 0;
                num <<= 1;
                if num2 & BITF != 0 {
                    num += 1;
                }
                if carry {
                    num ^= POLY;
                }
                num2 <<= 1;
            }
            i += 1;
        }
    }

    num.to_be_bytes()
}
