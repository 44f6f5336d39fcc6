use courier_wire::{encode_big_endian, BinaryNode};
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};

// marker byte identifying the key-bundle format in a retry receipt
pub const KEY_BUNDLE_TYPE: [u8; 1] = [5];

#[derive(Clone)]
pub struct PreKeyPair {
    pub id: u32,
    pub private: StaticSecret,
    pub public: [u8; 32],
}

#[derive(Clone)]
pub struct SignedPreKeyPair {
    pub id: u32,
    pub private: StaticSecret,
    pub public: [u8; 32],
    pub signature: [u8; 64],
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredsUpdate {
    pub next_prekey_id: u32,
    pub first_unuploaded_prekey_id: u32,
}

pub struct AuthCreds {
    pub registration_id: u32,
    pub identity_public: [u8; 32],
    signing: SigningKey,
    pub signed_prekey: SignedPreKeyPair,
    pub device_identity: Vec<u8>,
    next_prekey_id: u32,
    first_unuploaded_prekey_id: u32,
}

impl AuthCreds {
    pub fn generate(registration_id: u32) -> Self {
        let identity_private = StaticSecret::random_from_rng(OsRng);
        let identity_public = X25519Public::from(&identity_private).to_bytes();
        let signing = SigningKey::generate(&mut OsRng);
        let signed_prekey = generate_signed_prekey(&signing, 1);
        let device_identity = encode_device_identity(registration_id, &identity_public, &signing);
        Self {
            registration_id,
            identity_public,
            signing,
            signed_prekey,
            device_identity,
            next_prekey_id: 1,
            first_unuploaded_prekey_id: 1,
        }
    }

    pub fn identity_verifying_key(&self) -> VerifyingKey {
        VerifyingKey::from(&self.signing)
    }

    pub fn next_prekey_id(&self) -> u32 {
        self.next_prekey_id
    }

    // draws one fresh one-time prekey and advances the pool watermark
    pub fn take_next_prekey(&mut self) -> (PreKeyPair, CredsUpdate) {
        let id = self.next_prekey_id;
        let private = StaticSecret::random_from_rng(OsRng);
        let public = X25519Public::from(&private).to_bytes();
        self.next_prekey_id += 1;
        let update = CredsUpdate {
            next_prekey_id: self.next_prekey_id,
            first_unuploaded_prekey_id: self.first_unuploaded_prekey_id,
        };
        (
            PreKeyPair {
                id,
                private,
                public,
            },
            update,
        )
    }
}

fn generate_signed_prekey(signing: &SigningKey, id: u32) -> SignedPreKeyPair {
    let private = StaticSecret::random_from_rng(OsRng);
    let public = X25519Public::from(&private).to_bytes();
    let signature = signing.sign(&public).to_bytes();
    SignedPreKeyPair {
        id,
        private,
        public,
        signature,
    }
}

fn encode_device_identity(
    registration_id: u32,
    identity_public: &[u8; 32],
    signing: &SigningKey,
) -> Vec<u8> {
    let mut details = Vec::with_capacity(4 + 32);
    details.extend_from_slice(&encode_big_endian(registration_id, 4));
    details.extend_from_slice(identity_public);
    let signature = signing.sign(&details).to_bytes();
    let mut out = details;
    out.extend_from_slice(&signature);
    out
}

pub fn prekey_node(key: &PreKeyPair) -> BinaryNode {
    let mut node = BinaryNode::new("key");
    node.push_child(BinaryNode::with_bytes("id", encode_big_endian(key.id, 3)));
    node.push_child(BinaryNode::with_bytes("value", key.public.to_vec()));
    node
}

pub fn signed_prekey_node(key: &SignedPreKeyPair) -> BinaryNode {
    let mut node = BinaryNode::new("skey");
    node.push_child(BinaryNode::with_bytes("id", encode_big_endian(key.id, 3)));
    node.push_child(BinaryNode::with_bytes("value", key.public.to_vec()));
    node.push_child(BinaryNode::with_bytes(
        "signature",
        key.signature.to_vec(),
    ));
    node
}
