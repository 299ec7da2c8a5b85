use soroban_sdk::{contracttype, Bytes, BytesN, Env};

/// Largest modulus accepted for the counter key. Keeps every product of two
/// residues mod `n^2` inside `i128`.
///
/// This is a toy bound imposed by `i128` arithmetic: a modulus this small is
/// trivially factorable, so it hides counts from casual readers only. Counts
/// are also taken mod `n`, so a counter is only meaningful while its category
/// has fewer than `n` reveals; past that it wraps silently.
pub const MAX_MODULUS: i128 = 1 << 31;

/// Length of a counter ciphertext in transport form.
pub const COUNTER_TRANSPORT_LEN: u32 = 16;

/// Paillier public key used for the per-category counters.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaillierPublicKey {
    pub n: i128,  // n = p * q
    pub nn: i128, // n^2
    pub g: i128,  // g = n + 1
}

#[cfg(any(test, feature = "testutils"))]
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaillierPrivateKey {
    pub lambda: i128, // phi(n) = (p-1)(q-1)
    pub mu: i128,     // lambda^-1 mod n
}

/// Transport form of an opaque report field handle.
pub fn handle_to_transport(env: &Env, handle: &BytesN<32>) -> Bytes {
    Bytes::from_array(env, &handle.to_array())
}

pub struct HomomorphicEngine;

impl HomomorphicEngine {
    pub fn is_valid_key(key: &PaillierPublicKey) -> bool {
        key.n >= 3
            && key.n < MAX_MODULUS
            && key.nn == key.n * key.n
            && key.g == key.n + 1
    }

    /// c = (g^m * r^n) mod n^2 with r drawn from the ledger PRNG, coprime to n.
    pub fn encrypt(env: &Env, pub_key: &PaillierPublicKey, m: i128) -> i128 {
        let nn = pub_key.nn;
        let r = Self::random_unit(env, pub_key.n);

        let gm = Self::pow_mod(pub_key.g, m, nn);
        let rn = Self::pow_mod(r, pub_key.n, nn);

        (gm * rn) % nn
    }

    pub fn encrypt_zero(env: &Env, pub_key: &PaillierPublicKey) -> i128 {
        Self::encrypt(env, pub_key, 0)
    }

    pub fn encrypt_one(env: &Env, pub_key: &PaillierPublicKey) -> i128 {
        Self::encrypt(env, pub_key, 1)
    }

    /// Additive property: E(m1 + m2) = E(m1) * E(m2) mod n^2
    pub fn add_ciphertexts(pub_key: &PaillierPublicKey, c1: i128, c2: i128) -> i128 {
        (c1 * c2) % pub_key.nn
    }

    /// m = L(c^lambda mod n^2) * mu mod n, where L(u) = (u - 1) / n
    #[cfg(any(test, feature = "testutils"))]
    pub fn decrypt(pub_key: &PaillierPublicKey, priv_key: &PaillierPrivateKey, c: i128) -> i128 {
        let n = pub_key.n;
        let u = Self::pow_mod(c, priv_key.lambda, pub_key.nn);
        let l_u = (u - 1) / n;

        (l_u * priv_key.mu) % n
    }

    pub fn to_transport(env: &Env, c: i128) -> Bytes {
        Bytes::from_array(env, &c.to_be_bytes())
    }

    pub fn from_transport(bytes: &Bytes) -> Option<i128> {
        if bytes.len() != COUNTER_TRANSPORT_LEN {
            return None;
        }
        let mut buf = [0u8; COUNTER_TRANSPORT_LEN as usize];
        bytes.copy_into_slice(&mut buf);
        Some(i128::from_be_bytes(buf))
    }

    fn random_unit(env: &Env, n: i128) -> i128 {
        let upper = (n - 1) as u64;
        loop {
            let r = env.prng().gen_range::<u64>(1..=upper) as i128;
            if Self::gcd(r, n) == 1 {
                return r;
            }
        }
    }

    fn gcd(mut a: i128, mut b: i128) -> i128 {
        while b != 0 {
            let t = a % b;
            a = b;
            b = t;
        }
        a
    }

    fn pow_mod(mut base: i128, mut exp: i128, mod_val: i128) -> i128 {
        let mut res = 1;
        base %= mod_val;
        while exp > 0 {
            if exp % 2 == 1 {
                res = (res * base) % mod_val;
            }
            base = (base * base) % mod_val;
            exp /= 2;
        }
        res
    }
}
