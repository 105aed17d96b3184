//! A2S_INFO wire format: the fixed query datagram and the response decoder.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// `FF FF FF FF`, the `T` info request type, "Source Engine Query", NUL.
pub const INFO_REQUEST: [u8; 25] = *b"\xFF\xFF\xFF\xFFTSource Engine Query\0";

/// Header of a single-packet info response; `0x49` is the info type marker.
pub const INFO_RESPONSE_HEADER: [u8; 5] = [0xFF, 0xFF, 0xFF, 0xFF, 0x49];

/// Smallest buffer that can hold a response with four empty strings.
pub const MIN_RESPONSE_LEN: usize = 19;

/// Largest datagram read from the socket.
pub const MAX_RESPONSE_LEN: usize = 1400;

/// Positional fields of an info response, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Map,
    Folder,
    Game,
    AppId,
    Players,
    MaxPlayers,
    Bots,
    ServerType,
    Environment,
    Visibility,
    AntiCheat,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Name => "name",
            Field::Map => "map",
            Field::Folder => "folder",
            Field::Game => "game",
            Field::AppId => "app id",
            Field::Players => "players",
            Field::MaxPlayers => "max players",
            Field::Bots => "bots",
            Field::ServerType => "server type",
            Field::Environment => "environment",
            Field::Visibility => "visibility",
            Field::AntiCheat => "anti-cheat",
        };
        f.write_str(name)
    }
}

/// Reasons a response buffer is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("response too short: {0} < 19 bytes")]
    ResponseTooShort(usize),
    #[error("incorrect response header")]
    WrongHeader,
    #[error("can not read {0}: response truncated")]
    FieldTruncated(Field),
}

/// Decoded server status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerStatus {
    /// Time from sending the query to receiving the response.
    pub latency: Duration,
    pub protocol_version: u8,
    pub name: String,
    pub map: String,
    pub folder: String,
    pub game: String,
    pub app_id: u16,
    pub players: u8,
    pub max_players: u8,
    pub bots: u8,
    pub server_type: u8,
    pub environment: u8,
    pub visibility: u8,
    pub anti_cheat: u8,
}

/// Decode an info response.
///
/// The returned status has a zero latency; the caller measures and attaches it.
/// Bytes after the anti-cheat flag are ignored.
pub fn decode(buf: &[u8]) -> Result<ServerStatus, DecodeError> {
    if buf.len() < MIN_RESPONSE_LEN {
        return Err(DecodeError::ResponseTooShort(buf.len()));
    }

    if buf[..INFO_RESPONSE_HEADER.len()] != INFO_RESPONSE_HEADER {
        return Err(DecodeError::WrongHeader);
    }

    let protocol_version = buf[INFO_RESPONSE_HEADER.len()];
    let mut reader = Reader::new(&buf[INFO_RESPONSE_HEADER.len() + 1..]);

    Ok(ServerStatus {
        latency: Duration::ZERO,
        protocol_version,
        name: reader.read_string(Field::Name)?,
        map: reader.read_string(Field::Map)?,
        folder: reader.read_string(Field::Folder)?,
        game: reader.read_string(Field::Game)?,
        app_id: reader.read_u16_le(Field::AppId)?,
        players: reader.read_u8(Field::Players)?,
        max_players: reader.read_u8(Field::MaxPlayers)?,
        bots: reader.read_u8(Field::Bots)?,
        server_type: reader.read_u8(Field::ServerType)?,
        environment: reader.read_u8(Field::Environment)?,
        visibility: reader.read_u8(Field::Visibility)?,
        anti_cheat: reader.read_u8(Field::AntiCheat)?,
    })
}

/// Forward-only cursor over the response body.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn read_u8(&mut self, field: Field) -> Result<u8, DecodeError> {
        let b = *self
            .buf
            .get(self.pos)
            .ok_or(DecodeError::FieldTruncated(field))?;
        self.pos += 1;
        Ok(b)
    }

    fn read_u16_le(&mut self, field: Field) -> Result<u16, DecodeError> {
        let bytes = self
            .buf
            .get(self.pos..self.pos + 2)
            .ok_or(DecodeError::FieldTruncated(field))?;
        self.pos += 2;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read up to the next NUL; the terminator is consumed but not returned.
    fn read_string(&mut self, field: Field) -> Result<String, DecodeError> {
        let rest = &self.buf[self.pos..];
        let end = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(DecodeError::FieldTruncated(field))?;
        self.pos += end + 1;
        Ok(String::from_utf8_lossy(&rest[..end]).into_owned())
    }
}
