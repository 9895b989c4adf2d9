// Integration tests for several machines driven by one scheduler

use intcode::interpreter::machine::{Machine, Status};

/// Feed each amplifier its phase, then pass the signal around the ring until the
/// last amplifier halts. Returns the final signal.
fn amplifier_ring(program: &[i64], phases: &[i64]) -> i64 {
    let mut amps: Vec<Machine> = phases
        .iter()
        .map(|&phase| {
            let mut machine = Machine::new(program.to_vec());
            machine.push_input(phase);
            machine
        })
        .collect();

    let mut signal = 0;
    loop {
        for amp in amps.iter_mut() {
            amp.push_input(signal);
            amp.resume().expect("Amplifier failed");
            signal = *amp.output().back().expect("Amplifier produced no signal");
            amp.drain_output();
        }
        if amps.last().map_or(true, Machine::is_halted) {
            return signal;
        }
    }
}

#[test]
fn test_amplifier_chain() {
    let program = [
        3, 15, 3, 16, 1002, 16, 10, 16, 1, 16, 15, 15, 4, 15, 99, 0, 0,
    ];
    assert_eq!(amplifier_ring(&program, &[4, 3, 2, 1, 0]), 43210);

    let program = [
        3, 23, 3, 24, 1002, 24, 10, 24, 1002, 23, -1, 23, 101, 5, 23, 23, 1, 24, 23, 23, 4, 23,
        99, 0, 0,
    ];
    assert_eq!(amplifier_ring(&program, &[0, 1, 2, 3, 4]), 54321);
}

#[test]
fn test_amplifier_feedback_ring() {
    let program = [
        3, 26, 1001, 26, -4, 26, 3, 27, 1002, 27, 2, 27, 1, 27, 26, 27, 4, 27, 1001, 28, -1, 28,
        1005, 28, 6, 99, 0, 0, 5,
    ];
    assert_eq!(amplifier_ring(&program, &[9, 8, 7, 6, 5]), 139629729);
}

#[test]
fn test_ring_members_suspend_between_rounds() {
    let program = [
        3, 26, 1001, 26, -4, 26, 3, 27, 1002, 27, 2, 27, 1, 27, 26, 27, 4, 27, 1001, 28, -1, 28,
        1005, 28, 6, 99, 0, 0, 5,
    ];
    let mut amp = Machine::new(program.to_vec());
    amp.push_inputs([9, 0]);
    assert_eq!(amp.resume(), Ok(Status::AwaitingInput));
    assert_eq!(amp.output().len(), 1);
    // Parked on the `in` at address 6
    assert_eq!(amp.pc(), 6);
}

/// A network card: reads its address, then forwards every packet (x, y) it
/// receives to `address + 1` as (x + 1, y).
fn nic_program() -> Vec<i64> {
    vec![
        3, 50, // in [50]
        3, 51, // in [51]
        3, 52, // in [52]
        1001, 50, 1, 53, // add [50], #1 -> [53]
        4, 53, // out [53]
        1001, 51, 1, 51, // add [51], #1 -> [51]
        4, 51, // out [51]
        4, 52, // out [52]
        1105, 1, 2, // jnz #1, #2
    ]
}

#[test]
fn test_packet_network() {
    const NODES: usize = 4;
    const NAT: i64 = NODES as i64;

    let mut nodes: Vec<Machine> = (0..NODES)
        .map(|address| {
            let mut machine = Machine::new(nic_program());
            machine.push_input(address as i64);
            machine
        })
        .collect();
    nodes[0].push_inputs([0, 77]);

    let mut delivered = None;
    let mut rounds = 0;
    while delivered.is_none() {
        rounds += 1;
        assert!(rounds < 100, "Network never delivered to the NAT");

        for i in 0..NODES {
            nodes[i].resume().expect("Node failed");
            let sent = nodes[i].drain_output();
            for packet in sent.chunks(3) {
                let (dest, x, y) = (packet[0], packet[1], packet[2]);
                if dest == NAT {
                    delivered = Some((x, y));
                } else {
                    nodes[dest as usize].push_inputs([x, y]);
                }
            }
        }
    }

    assert_eq!(delivered, Some((4, 77)));
    // Every card is idle on an empty queue, none halted
    assert!(nodes.iter().all(Machine::is_awaiting_input));
}

#[test]
fn test_machines_do_not_share_memory() {
    let program = vec![3, 0, 4, 0, 99];
    let mut a = Machine::new(program.clone());
    let mut b = Machine::new(program);

    assert_eq!(a.run(&[11]).unwrap().output, vec![11]);
    assert_eq!(b.peek(0), 3);
    assert_eq!(b.run(&[22]).unwrap().output, vec![22]);
    assert_eq!(a.peek(0), 11);
}
