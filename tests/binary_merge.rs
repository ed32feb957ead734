use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use flowkeep::config::Config;
use flowkeep::message::Message;
use flowkeep::runtime::input::Feed;
use flowkeep::Scope;

#[test]
fn binary_merges_both_inputs() {
    let _ = env_logger::try_init();
    let mut scope = Scope::new();
    let (left, left_feed) = scope.new_input();
    let (right, right_feed) = scope.new_input();
    let merged = scope.binary(left, right, |_dir, msg| Some(msg));

    let (tx, rx) = mpsc::channel();
    scope.inspect(merged, move |msg, _ts| {
        tx.send(String::from_utf8_lossy(msg.as_bytes()).to_string()).unwrap();
        Ok(())
    });

    let (mut worker, cancel, handles) = scope.build(Config::default());
    let worker_thread = thread::spawn(move || worker.run());

    left_feed.send(Feed::Advance { epoch: 0, message: Message::from_str("L0") }).unwrap();
    right_feed.send(Feed::Advance { epoch: 0, message: Message::from_str("R0") }).unwrap();

    let mut seen = Vec::new();
    for _ in 0..2 {
        seen.push(rx.recv_timeout(Duration::from_secs(2)).expect("merged message observed"));
    }
    seen.sort();
    assert_eq!(seen, vec!["L0".to_string(), "R0".to_string()]);

    cancel.cancel();
    worker_thread.join().unwrap().unwrap();
    drop(handles);
}
