//! Dynamixel Protocol 1.0 packet codec and a register link on top of any
//! byte port.
//!
//! Instruction packet: `FF FF id len instr params.. checksum`
//! Status packet:      `FF FF id len error params.. checksum`
//!
//! `len` counts the bytes after itself; the checksum is the inverted low byte
//! of the sum of every byte between the header and the checksum.

use std::io::{self, Read, Write};

use mtt_traits::{ActuatorLink, LinkError, Register};

use crate::error::{CommResult, DeviceFault, LinkFault, Result};

pub const HEADER: [u8; 2] = [0xFF, 0xFF];
pub const BROADCAST_ID: u8 = 0xFE;

pub const INST_PING: u8 = 0x01;
pub const INST_READ: u8 = 0x02;
pub const INST_WRITE: u8 = 0x03;

/// Model number lives in the first two bytes of every control table.
const ADDR_MODEL_NUMBER: u8 = 0;
/// Upper bound on bytes skipped while looking for a status header.
const MAX_SYNC_BYTES: usize = 64;

/// Byte transport the link runs over.
pub trait Port: Read + Write {
    /// Drop stale bytes before a new transaction.
    fn discard_input(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[inline]
pub fn checksum(body: &[u8]) -> u8 {
    !body.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

pub fn encode_instruction(id: u8, instruction: u8, params: &[u8]) -> Result<Vec<u8>> {
    // instruction + params + checksum must fit the length byte
    let len = u8::try_from(params.len() + 2).map_err(|_| LinkFault::Comm(CommResult::TxError))?;
    let mut pkt = Vec::with_capacity(usize::from(len) + 4);
    pkt.extend_from_slice(&HEADER);
    pkt.extend_from_slice(&[id, len, instruction]);
    pkt.extend_from_slice(params);
    pkt.push(checksum(&pkt[2..]));
    Ok(pkt)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPacket {
    pub id: u8,
    pub error: u8,
    pub params: Vec<u8>,
}

/// Decode one complete status packet (header included).
pub fn decode_status(frame: &[u8]) -> Result<StatusPacket> {
    let corrupt = || LinkFault::Comm(CommResult::RxCorrupt);
    if frame.len() < 6 || frame[..2] != HEADER {
        return Err(corrupt());
    }
    let id = frame[2];
    let len = usize::from(frame[3]);
    if len < 2 || frame.len() != len + 4 {
        return Err(corrupt());
    }
    let (body, cs) = frame[2..].split_at(frame.len() - 3);
    if checksum(body) != cs[0] {
        return Err(corrupt());
    }
    Ok(StatusPacket {
        id,
        error: frame[4],
        params: frame[5..frame.len() - 1].to_vec(),
    })
}

fn rx_error(e: &io::Error) -> LinkFault {
    match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
            LinkFault::Comm(CommResult::RxTimeout)
        }
        _ => LinkFault::Comm(CommResult::RxFail),
    }
}

fn read_byte<P: Read>(port: &mut P) -> Result<u8> {
    let mut b = [0u8; 1];
    port.read_exact(&mut b).map_err(|e| rx_error(&e))?;
    Ok(b[0])
}

/// Read one status packet, skipping any noise before the header.
pub fn read_status<P: Read>(port: &mut P) -> Result<StatusPacket> {
    let mut prev = read_byte(port)?;
    let mut skipped = 0usize;
    let id = loop {
        let b = read_byte(port)?;
        if prev == 0xFF && b == 0xFF {
            // tolerate runs of FF by sliding until a non-FF id byte shows up
            let mut next = read_byte(port)?;
            while next == 0xFF {
                skipped += 1;
                if skipped > MAX_SYNC_BYTES {
                    return Err(LinkFault::Comm(CommResult::RxCorrupt));
                }
                next = read_byte(port)?;
            }
            break next;
        }
        skipped += 1;
        if skipped > MAX_SYNC_BYTES {
            return Err(LinkFault::Comm(CommResult::RxCorrupt));
        }
        prev = b;
    };
    let len = read_byte(port)?;
    if len < 2 {
        return Err(LinkFault::Comm(CommResult::RxCorrupt));
    }
    let mut frame = Vec::with_capacity(usize::from(len) + 4);
    frame.extend_from_slice(&HEADER);
    frame.extend_from_slice(&[id, len]);
    let mut rest = vec![0u8; usize::from(len)];
    port.read_exact(&mut rest).map_err(|e| rx_error(&e))?;
    frame.extend_from_slice(&rest);
    decode_status(&frame)
}

/// Register link speaking Protocol 1.0 over `P`.
#[derive(Debug)]
pub struct Protocol1Link<P: Port> {
    port: Option<P>,
}

impl<P: Port> Protocol1Link<P> {
    pub fn new(port: P) -> Self {
        Self { port: Some(port) }
    }

    /// Hand the port back, e.g. to inspect a test double.
    pub fn into_inner(self) -> Option<P> {
        self.port
    }

    fn transaction(&mut self, id: u8, instruction: u8, params: &[u8]) -> Result<StatusPacket> {
        if id == BROADCAST_ID {
            // broadcast packets get no status reply
            return Err(LinkFault::Comm(CommResult::NotAvailable));
        }
        let port = self.port.as_mut().ok_or(LinkFault::Closed)?;
        let pkt = encode_instruction(id, instruction, params)?;
        port.discard_input()
            .map_err(|_| LinkFault::Comm(CommResult::PortBusy))?;
        port.write_all(&pkt)
            .and_then(|()| port.flush())
            .map_err(|_| LinkFault::Comm(CommResult::TxFail))?;

        let status = read_status(port)?;
        if status.id != id {
            return Err(LinkFault::Comm(CommResult::RxCorrupt));
        }
        if status.error != 0 {
            return Err(LinkFault::Device(DeviceFault(status.error)));
        }
        Ok(status)
    }

    fn read_bytes(&mut self, id: u8, addr: u8, len: u8) -> Result<Vec<u8>> {
        let status = self.transaction(id, INST_READ, &[addr, len])?;
        if status.params.len() != usize::from(len) {
            return Err(LinkFault::Comm(CommResult::RxCorrupt));
        }
        Ok(status.params)
    }
}

fn short_addr(reg: Register) -> Result<u8> {
    u8::try_from(reg.addr).map_err(|_| LinkFault::Comm(CommResult::NotAvailable))
}

impl<P: Port> ActuatorLink for Protocol1Link<P> {
    fn ping(&mut self, id: u8) -> std::result::Result<u16, LinkError> {
        self.transaction(id, INST_PING, &[])?;
        let model = self.read_bytes(id, ADDR_MODEL_NUMBER, 2)?;
        Ok(u16::from_le_bytes([model[0], model[1]]))
    }

    fn read(&mut self, id: u8, reg: Register) -> std::result::Result<u32, LinkError> {
        let addr = short_addr(reg)?;
        let bytes = self.read_bytes(id, addr, reg.width.bytes())?;
        let value = bytes
            .iter()
            .rev()
            .fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
        Ok(value)
    }

    fn write(&mut self, id: u8, reg: Register, value: u32) -> std::result::Result<(), LinkError> {
        if value > reg.width.max_value() {
            return Err(Box::new(LinkFault::Comm(CommResult::TxError)));
        }
        let addr = short_addr(reg)?;
        let mut params = Vec::with_capacity(5);
        params.push(addr);
        params.extend_from_slice(&value.to_le_bytes()[..usize::from(reg.width.bytes())]);
        self.transaction(id, INST_WRITE, &params)?;
        Ok(())
    }

    fn close(&mut self) -> std::result::Result<(), LinkError> {
        if let Some(mut port) = self.port.take() {
            port.flush().map_err(LinkFault::from)?;
        }
        Ok(())
    }
}
