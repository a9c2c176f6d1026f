//! Parameters and round constants of the width-12 Poseidon2 permutation.
//!
//! [INTERNAL_MATRIX_DIAG] is the published Goldilocks width-12 diagonal.
//! [EXTERNAL_CONSTANTS] and [INTERNAL_CONSTANTS] are NOT the published
//! Goldilocks width-12 round constants. Those ship with the upstream
//! `qp-poseidon-constants` tables, which this workspace cannot depend on.
//! Until both tables are replaced, hashes, challenges and gate evaluations
//! differ from a standard Poseidon2 plonky2 prover and a genuine proof will
//! not verify. The known-answer vectors in `tests/poseidon2.rs` are pinned to
//! the tables below.
//!
//! The placeholder tables are the first `ROUNDS_F * WIDTH + ROUNDS_P` values
//! `v < p` obtained by reading the first 8 bytes of
//! `sha256(PLACEHOLDER_CONSTANTS_DOMAIN || counter.to_le_bytes())` as a
//! little-endian `u64`, for `counter = 0, 1, ...`. External rows come first.

/// The number of lanes of the state.
pub const WIDTH: usize = 12;

/// The number of lanes absorbed per permutation.
pub const RATE: usize = 8;

/// The number of lanes squeezed per permutation.
pub const OUT: usize = 4;

/// Full (external) rounds, split evenly around the partial rounds.
pub const ROUNDS_F: usize = 8;

pub const ROUNDS_F_HALF: usize = ROUNDS_F / 2;

/// Partial (internal) rounds.
pub const ROUNDS_P: usize = 22;

pub const SBOX_DEGREE: u64 = 7;

/// Domain tag of the placeholder round constants.
pub const PLACEHOLDER_CONSTANTS_DOMAIN: &[u8] = b"goldilocks-poseidon2-w12";

/// Diagonal of the internal matrix, `M_I = 1 + diag(INTERNAL_MATRIX_DIAG)`.
/// Same values as p3 `MATRIX_DIAG_12_GOLDILOCKS`.
pub const INTERNAL_MATRIX_DIAG: [u64; WIDTH] = [
    0xc3b6c08e23ba9300,
    0xd84b5de94a324fb6,
    0x0d0c371c5b35b84f,
    0x7964f570e7188037,
    0x5daf18bbd996604b,
    0x6743bc47b9595257,
    0x5528b9362c59bb70,
    0xac45e25b7127b68b,
    0xa2077d7dfbb606b5,
    0xf3faac6faee378ae,
    0x0c6388b51545e883,
    0xd27dbb6944917b60,
];

pub const EXTERNAL_CONSTANTS: [[u64; WIDTH]; ROUNDS_F] = [
    [
        0x1aa3d93d2f0fdbf6, 0x75a8e923a2a8a143, 0xef4b5374b177e17c,
        0x566054a7329db5a2, 0x7707940f4e9a2853, 0xbf32d0f8fc558a0a,
        0xa100a8cd684c0711, 0xca5e944bfaa078da, 0x11dbe03049e21b38,
        0x87a34fdafc10adb3, 0xbcd09c0e935c58c9, 0xb018803ca39cda91,
    ],
    [
        0x621017c03b17b237, 0x188568e792ffd48b, 0x7fb0686a9ec5ed4d,
        0xcf034e2c777464f1, 0xc20010bee787be07, 0x41d15d3b31040262,
        0xeb6012c8f7dddd68, 0x628a113c1f9500ed, 0x95d832a9da7e8b63,
        0xa5551f93cd8b6864, 0x414a4a26f13ed283, 0x1644b7690fa39b76,
    ],
    [
        0x355fc2a457538076, 0x1f17e0132f46141d, 0x0a24c7b9a243adcb,
        0x648db1f227dc6e5b, 0x6b159536884a4a53, 0x1d2bb1c957531447,
        0x464506c514ed839e, 0x5b7d48d945265ca0, 0x30555de5b074a4c1,
        0x89cd6e4196900321, 0xd6de26882b95b507, 0x836253df563403e4,
    ],
    [
        0xb57b85262066019a, 0xe3fe43df7eaa818e, 0xfac0d4d677ef3a57,
        0xa9d85c086e34a3ab, 0x4bba2741dd6c81c1, 0xd3085b677b260972,
        0x2b40e41dcc549015, 0x870a437a52bb27d3, 0x521de903dc45c182,
        0x7b18a186f68c6830, 0x42acdccc6da33bdb, 0x5e47ca464f14784e,
    ],
    [
        0x22f667287b168a80, 0x04b660cd8a0a9375, 0x4d94fd9a30fc7c70,
        0x8b949994eb7f7e85, 0x223905219feabe2c, 0xc19bc75eb9511c15,
        0xf52d31d07fdec993, 0x7c86a53e9c7f50bd, 0xa8246ca044f62ce0,
        0xf3412c3a17aead15, 0xf454452bac81156a, 0xad7f57d065eb47e9,
    ],
    [
        0xcf8985146469eb56, 0xb3c6570483b70b23, 0x73230d5a6d976e4f,
        0xbdbb0da5bf9072bd, 0x231f2b39052efc70, 0xbf9deadb5a7ce257,
        0x49c65617dd993b97, 0xa4316e88ed73293b, 0x00916cc6c6610b72,
        0xa416b1323a45b4d3, 0xfed4a2a3ae019241, 0xfcd6c2a8e327e871,
    ],
    [
        0x73292fbaeab2f131, 0x572e58362aaf561d, 0xcc076de5d7ee3178,
        0x04091fc89567577b, 0xdfaa49276fbb2194, 0x87c4e9e4d2c80c11,
        0x28fc5a80eef2e83b, 0x4fb778eb74bb8821, 0x0c6d247213192bdf,
        0x2c89a14e30968d24, 0x303c1a4348ed94fc, 0x4fa57b6121875c44,
    ],
    [
        0xb7a9821d724dfb9a, 0x418e2a012f12ba38, 0x37d84a45c9bf9e3a,
        0xac66c8d33ab9df57, 0x63e71361394574f7, 0x44287255853402f9,
        0x7ee863c461939b75, 0x35b8bfd0167782ce, 0x138a20615cdf7716,
        0xb7447e9aaf369f30, 0x66e27bbe71f97663, 0x545663ba38a98bc7,
    ],
];

pub const INTERNAL_CONSTANTS: [u64; ROUNDS_P] = [
    0xc33fa02b9ba763bf, 0x76e78ed4e631b09f, 0x30d76be9612617c9,
    0x400a7eefc97d74b1, 0xf5fccded667ece97, 0x6c9ed43a609dcd6d,
    0x6265da4b4bdc9fb2, 0xd8215219cd082020, 0xcd096c763a17af23,
    0x0a89b1106d27340a, 0xb35dd6ad618195fd, 0xd1c95c5ad96f4be2,
    0x29fde3a619201a66, 0x2209450fa3b4b794, 0x4ec14ab50d0cb81f,
    0xdc42eb596c8eb935, 0x5c785101a077cb2e, 0x7821d05dc8db1282,
    0x1cf1b36515bed79a, 0x8551d9c3a9192ff7, 0xdcaa92df890c4c26,
    0x44aab39ce458bffb,
];
