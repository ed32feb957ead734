use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use flowkeep::config::Config;
use flowkeep::message::Message;
use flowkeep::runtime::input::Feed;
use flowkeep::Scope;

#[test]
fn linear_passthrough_through_two_inspects() {
    let _ = env_logger::try_init();
    let mut scope = Scope::new();
    let (input, feed) = scope.new_input();

    let (tx, rx) = mpsc::channel();
    let tx_a = tx.clone();
    let after_a = scope.inspect(input, move |msg, _ts| {
        tx_a.send(format!("a:{}", String::from_utf8_lossy(msg.as_bytes()))).unwrap();
        Ok(())
    });
    scope.inspect(after_a, move |msg, _ts| {
        tx.send(format!("b:{}", String::from_utf8_lossy(msg.as_bytes()))).unwrap();
        Ok(())
    });

    let (mut worker, cancel, handles) = scope.build(Config::default());
    let worker_thread = thread::spawn(move || worker.run());

    feed.send(Feed::Advance { epoch: 0, message: Message::from_str("hello") }).unwrap();

    let mut seen = Vec::new();
    for _ in 0..2 {
        seen.push(rx.recv_timeout(Duration::from_secs(2)).expect("message observed"));
    }
    seen.sort();
    assert_eq!(seen, vec!["a:hello".to_string(), "b:hello".to_string()]);

    feed.send(Feed::Close).unwrap();
    cancel.cancel();
    worker_thread.join().unwrap().unwrap();
    for h in handles {
        let _ = h.join();
    }
}
