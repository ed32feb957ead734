use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use flowkeep::config::Config;
use flowkeep::message::Message;
use flowkeep::runtime::input::Feed;
use flowkeep::Scope;

#[test]
fn filter_drops_odd_messages() {
    let _ = env_logger::try_init();
    let mut scope = Scope::new();
    let (input, feed) = scope.new_input();
    let evens = scope.filter(input, |msg| {
        let n: u32 = String::from_utf8_lossy(msg.as_bytes()).parse().unwrap();
        n % 2 == 0
    });

    let (tx, rx) = mpsc::channel();
    scope.inspect(evens, move |msg, _ts| {
        tx.send(String::from_utf8_lossy(msg.as_bytes()).to_string()).unwrap();
        Ok(())
    });

    let (mut worker, cancel, handles) = scope.build(Config::default());
    let worker_thread = thread::spawn(move || worker.run());

    for n in 0..5u32 {
        feed.send(Feed::Advance { epoch: n, message: Message::from_str(&n.to_string()) }).unwrap();
    }

    let mut seen = Vec::new();
    for _ in 0..3 {
        seen.push(rx.recv_timeout(Duration::from_secs(2)).expect("even message observed"));
    }
    seen.sort();
    assert_eq!(seen, vec!["0".to_string(), "2".to_string(), "4".to_string()]);

    cancel.cancel();
    worker_thread.join().unwrap().unwrap();
    drop(handles);
}
