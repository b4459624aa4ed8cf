//! Log packet encoding for the outbound debug link.
//!
//! The host terminal reassembles these into colored log lines. Packet
//! layout: module id, status code, message length, message bytes, data
//! length (u32 little-endian), data bytes.
//!
//! Status codes share one byte across all modules, partitioned by severity:
//! INFO is 0-19, WARN is 20-39, ERR is 40-59.

use heapless::Vec;

/// First status code of the INFO range
pub const STATUS_INFO_BASE: u8 = 0;

/// First status code of the WARN range
pub const STATUS_WARN_BASE: u8 = 20;

/// First status code of the ERR range
pub const STATUS_ERR_BASE: u8 = 40;

/// One past the last valid status code
pub const STATUS_END: u8 = 60;

/// Maximum message bytes carried by one packet
pub const MAX_LOG_MSG: usize = 64;

/// Maximum data bytes carried by one packet
pub const MAX_LOG_DATA: usize = 64;

/// Maximum encoded packet size (header + message + data length + data)
pub const MAX_LOG_PACKET: usize = 3 + MAX_LOG_MSG + 4 + MAX_LOG_DATA;

/// Errors that can occur during log packet encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogPacketError {
    /// Destination buffer cannot hold the encoded packet
    BufferTooSmall,
}

/// A log packet awaiting encoding
///
/// Messages and data longer than the per-packet maxima are truncated at
/// encode time; the host treats a truncated tail as acceptable loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogPacket<'a> {
    /// Originating module id
    pub module: u8,
    /// Status code (see the severity ranges above)
    pub status: u8,
    /// Human-readable message, possibly empty
    pub message: &'a str,
    /// Binary attachment, possibly empty
    pub data: &'a [u8],
}

impl<'a> LogPacket<'a> {
    /// Encode this packet into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, LogPacketError> {
        let msg = self.message.as_bytes();
        let msg_len = msg.len().min(MAX_LOG_MSG);
        let data_len = self.data.len().min(MAX_LOG_DATA);

        let total = 3 + msg_len + 4 + data_len;
        if buffer.len() < total {
            return Err(LogPacketError::BufferTooSmall);
        }

        buffer[0] = self.module;
        buffer[1] = self.status;
        buffer[2] = msg_len as u8;
        buffer[3..3 + msg_len].copy_from_slice(&msg[..msg_len]);

        let data_start = 3 + msg_len + 4;
        buffer[3 + msg_len..data_start].copy_from_slice(&(data_len as u32).to_le_bytes());
        buffer[data_start..data_start + data_len].copy_from_slice(&self.data[..data_len]);

        Ok(total)
    }

    /// Encode this packet into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_LOG_PACKET>, LogPacketError> {
        let mut buffer = [0u8; MAX_LOG_PACKET];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| LogPacketError::BufferTooSmall)?;
        Ok(vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_message_only() {
        let packet = LogPacket {
            module: 0x01,
            status: STATUS_INFO_BASE,
            message: "ok",
            data: &[],
        };

        let encoded = packet.encode_to_vec().unwrap();
        assert_eq!(encoded[0], 0x01); // module
        assert_eq!(encoded[1], 0); // status
        assert_eq!(encoded[2], 2); // msglen
        assert_eq!(&encoded[3..5], b"ok");
        assert_eq!(&encoded[5..9], &0u32.to_le_bytes()); // datalen
        assert_eq!(encoded.len(), 9);
    }

    #[test]
    fn test_encode_with_data() {
        let packet = LogPacket {
            module: 0x03,
            status: STATUS_ERR_BASE + 1,
            message: "",
            data: &[0xDE, 0xAD],
        };

        let encoded = packet.encode_to_vec().unwrap();
        assert_eq!(encoded[2], 0); // no message
        assert_eq!(&encoded[3..7], &2u32.to_le_bytes());
        assert_eq!(&encoded[7..9], &[0xDE, 0xAD]);
    }

    #[test]
    fn test_encode_truncates_long_message() {
        let long = core::str::from_utf8(&[b'x'; 200]).unwrap();
        let packet = LogPacket {
            module: 0x00,
            status: STATUS_WARN_BASE,
            message: long,
            data: &[],
        };

        let encoded = packet.encode_to_vec().unwrap();
        assert_eq!(encoded[2] as usize, MAX_LOG_MSG);
        assert_eq!(encoded.len(), 3 + MAX_LOG_MSG + 4);
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let packet = LogPacket {
            module: 0x00,
            status: 0,
            message: "hello",
            data: &[],
        };

        let mut buffer = [0u8; 4];
        assert_eq!(packet.encode(&mut buffer), Err(LogPacketError::BufferTooSmall));
    }
}
