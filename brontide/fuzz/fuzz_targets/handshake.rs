#![no_main]

use arbitrary::Arbitrary;
use commonware_brontide::{
    handshake::{Initiator, Responder, ACT_ONE_LENGTH, ACT_THREE_LENGTH, ACT_TWO_LENGTH},
    PrivateKey,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
pub struct FuzzInput {
    initiator_seed: u64,
    responder_seed: u64,
    ephemeral_seed: u64,
    act_one: [u8; ACT_ONE_LENGTH],
    act_two: [u8; ACT_TWO_LENGTH],
    act_three: [u8; ACT_THREE_LENGTH],
    tamper: Option<(u8, u8, u8)>,
}

fn arbitrary_acts(input: &FuzzInput) {
    let responder_static = PrivateKey::from_seed(input.responder_seed);
    let responder_public = responder_static.public_key();

    // A responder fed attacker-controlled acts must fail cleanly
    if let Ok(responder) = Responder::new(responder_static).recv_act_one(&input.act_one) {
        let ephemeral = PrivateKey::from_seed(input.ephemeral_seed);
        if let Ok((responder, _)) = responder.act_two(ephemeral) {
            assert!(responder.recv_act_three(&input.act_three).is_err());
        }
    }

    // An initiator fed an attacker-controlled act two must fail cleanly
    let initiator = Initiator::new(PrivateKey::from_seed(input.initiator_seed), responder_public);
    let ephemeral = PrivateKey::from_seed(input.ephemeral_seed);
    if let Ok((initiator, _)) = initiator.act_one(ephemeral) {
        assert!(initiator.act_three(&input.act_two).is_err());
    }
}

fn tampered_exchange(input: &FuzzInput) {
    let initiator_static = PrivateKey::from_seed(input.initiator_seed);
    let responder_static = PrivateKey::from_seed(input.responder_seed);
    if initiator_static.public_key() == responder_static.public_key() {
        return;
    }
    let initiator = Initiator::new(initiator_static.clone(), responder_static.public_key());
    let responder = Responder::new(responder_static);

    let initiator_ephemeral = PrivateKey::from_seed(input.ephemeral_seed);
    let responder_ephemeral = PrivateKey::from_seed(input.ephemeral_seed.wrapping_add(1));

    // Pick at most one act to corrupt
    let tamper = input
        .tamper
        .filter(|(_, _, mask)| *mask != 0)
        .map(|(act, index, mask)| (act % 3, index as usize, mask));
    let flip = |bytes: &mut [u8], which: u8| {
        if let Some((act, index, mask)) = tamper {
            if act == which {
                bytes[index % bytes.len()] ^= mask;
            }
        }
    };
    let tampered = |which: u8| matches!(tamper, Some((act, _, _)) if act == which);

    let (initiator, mut act_one) = initiator.act_one(initiator_ephemeral).unwrap();
    flip(&mut act_one, 0);
    let Ok(responder) = responder.recv_act_one(&act_one) else {
        assert!(tampered(0));
        return;
    };
    assert!(!tampered(0));

    let (responder, mut act_two) = responder.act_two(responder_ephemeral).unwrap();
    flip(&mut act_two, 1);
    let Ok((mut act_three, initiator_session)) = initiator.act_three(&act_two) else {
        assert!(tampered(1));
        return;
    };
    assert!(!tampered(1));

    flip(&mut act_three, 2);
    let Ok(responder_session) = responder.recv_act_three(&act_three) else {
        assert!(tampered(2));
        return;
    };
    assert!(!tampered(2));
    assert_eq!(responder_session.remote_static, initiator_static.public_key());

    let mut send = initiator_session.send;
    let mut recv = responder_session.recv;
    let sealed = send.seal(&input.act_three).unwrap();
    assert_eq!(recv.open(&sealed).unwrap(), input.act_three);
}

fn fuzz(input: FuzzInput) {
    arbitrary_acts(&input);
    tampered_exchange(&input);
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
