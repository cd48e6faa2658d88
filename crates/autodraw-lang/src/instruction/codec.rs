//! Wire format: per instruction `code:u16be count:u16be` then `count` × `i16be`.

use crate::error::CodecError;
use crate::instruction::{Command, Instruction};

const HEADER_LEN: usize = 4;

pub fn encode(instructions: &[Instruction]) -> Vec<u8> {
    let size = instructions.iter().map(|i| HEADER_LEN + 2 * i.args().len()).sum();
    let mut out = Vec::with_capacity(size);
    for inst in instructions {
        encode_one(inst, &mut out);
    }
    out
}

pub fn encode_one(inst: &Instruction, out: &mut Vec<u8>) {
    out.extend_from_slice(&inst.command().code().to_be_bytes());
    // Instruction::new bounds the length by MAX_ARGS.
    out.extend_from_slice(&(inst.args().len() as u16).to_be_bytes());
    for a in inst.args() {
        out.extend_from_slice(&a.to_be_bytes());
    }
}

/// Decodes a whole stream. Any malformed instruction fails the entire call.
pub fn decode(bytes: &[u8]) -> Result<Vec<Instruction>, CodecError> {
    let mut reader = Reader { bytes, pos: 0 };
    let mut out = Vec::new();
    while !reader.at_end() {
        out.push(reader.instruction()?);
    }
    Ok(out)
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn at_end(&self) -> bool { self.pos >= self.bytes.len() }

    fn take(&mut self, n: usize, start: usize) -> Result<&[u8], CodecError> {
        let available = self.bytes.len() - self.pos;
        if available < n {
            return Err(CodecError::Truncated { offset: start, needed: n, available });
        }
        let s = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(s)
    }

    fn instruction(&mut self) -> Result<Instruction, CodecError> {
        let start = self.pos;
        let header = self.take(HEADER_LEN, start)?;
        let code = u16::from_be_bytes([header[0], header[1]]);
        let count = usize::from(u16::from_be_bytes([header[2], header[3]]));
        let command = Command::from_code(code)
            .ok_or(CodecError::UnknownCommand { offset: start, code })?;

        let body = self.take(2 * count, start)?;
        let args = body
            .chunks_exact(2)
            .map(|b| i16::from_be_bytes([b[0], b[1]]))
            .collect();
        Instruction::new(command, args)
            .map_err(|source| CodecError::BadArguments { offset: start, source })
    }
}
