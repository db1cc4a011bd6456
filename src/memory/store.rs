//! Machine memory

use crate::arch::ArchParams;
use crate::memory::BitString;
use std::collections::HashMap;

/// log2 of the number of bits held by one page.
const PAGE_SHIFT: u32 = 12;

const WORDS_PER_PAGE: usize = (1 << PAGE_SHIFT) / 64;

type Page = Box<[u64; WORDS_PER_PAGE]>;

/// The flat, bit-addressable memory of a jaw machine.
///
/// Memory holds `2^register_width` bits, far more than can be allocated for
/// larger values of `m`, so it is stored as a sparse set of pages which are
/// only allocated once a 1 bit is written to them. Every bit that was never
/// written reads as 0.
///
/// All addresses are reduced modulo the size of memory.
pub struct Memory {
    params: ArchParams,
    pages: HashMap<u128, Page>,
}

impl Memory {
    pub fn new(params: ArchParams) -> Self {
        Memory {
            params,
            pages: HashMap::new(),
        }
    }

    fn locate(&self, addr: u128) -> (u128, usize, u32) {
        let addr = self.params.wrap(addr);
        let within = (addr & ((1 << PAGE_SHIFT) - 1)) as usize;

        (addr >> PAGE_SHIFT, within / 64, (within % 64) as u32)
    }

    pub fn read_bit(&self, addr: u128) -> bool {
        let (page, word, bit) = self.locate(addr);

        self.pages
            .get(&page)
            .map_or(false, |p| (p[word] >> bit) & 1 == 1)
    }

    pub fn write_bit(&mut self, addr: u128, value: bool) {
        let (page, word, bit) = self.locate(addr);

        if value {
            let p = self
                .pages
                .entry(page)
                .or_insert_with(|| Box::new([0; WORDS_PER_PAGE]));
            p[word] |= 1u64 << bit;
        } else if let Some(p) = self.pages.get_mut(&page) {
            p[word] &= !(1u64 << bit);
        }
    }

    /// Copy a bit string into memory, starting at `base`.
    pub fn load(&mut self, bits: &BitString, base: u128) {
        for (i, bit) in bits.iter().enumerate() {
            self.write_bit(base.wrapping_add(i as u128), bit);
        }
    }

    /// How many pages are backed by real storage.
    pub fn allocated_pages(&self) -> usize {
        self.pages.len()
    }
}
