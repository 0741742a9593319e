use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};

/// Lifetime per-player statistics. Created lazily on first play,
/// mutated additively, never reset.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PlayerStats {
    pub total_games: u64,
    pub total_wins: u64,
    pub limited_edition_wins: u32,
    pub has_limited_edition: bool,
}

impl PlayerStats {
    /// Record one resolved play. The limited edition flag is monotone:
    /// once set it never reverts.
    pub fn record(&mut self, won: bool, limited_edition: bool) {
        self.total_games = self.total_games.saturating_add(1);
        if won {
            self.total_wins = self.total_wins.saturating_add(1);
        }
        if limited_edition {
            self.limited_edition_wins = self.limited_edition_wins.saturating_add(1);
            self.has_limited_edition = true;
        }
    }
}

impl Write for PlayerStats {
    fn write(&self, writer: &mut impl BufMut) {
        self.total_games.write(writer);
        self.total_wins.write(writer);
        self.limited_edition_wins.write(writer);
        self.has_limited_edition.write(writer);
    }
}

impl Read for PlayerStats {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            total_games: u64::read(reader)?,
            total_wins: u64::read(reader)?,
            limited_edition_wins: u32::read(reader)?,
            has_limited_edition: bool::read(reader)?,
        })
    }
}

impl EncodeSize for PlayerStats {
    fn encode_size(&self) -> usize {
        self.total_games.encode_size()
            + self.total_wins.encode_size()
            + self.limited_edition_wins.encode_size()
            + self.has_limited_edition.encode_size()
    }
}
