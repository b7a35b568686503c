mod common;
use common::TestEnv;
use ironlog::{LogOptions, SyncMode};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_concurrent_appends() {
  let mut opts = LogOptions::default();
  opts.sync_mode = SyncMode::Async;
  let env = TestEnv::new(opts);
  let stream = "concurrent_stream";

  let thread_count = 10;
  let items_per_thread = 100;

  let barrier = Arc::new(Barrier::new(thread_count));
  let mut handles = Vec::new();

  for t_id in 0..thread_count {
    let store = env.store.clone();
    let barrier = barrier.clone();

    handles.push(thread::spawn(move || {
      barrier.wait();
      for i in 0..items_per_thread {
        store.append(stream, &format!("t{}_i{}", t_id, i)).unwrap();
      }
    }));
  }

  for h in handles {
    h.join().unwrap();
  }

  let raw = env.raw_stream(stream);
  let lines: Vec<&str> = raw.lines().collect();
  assert_eq!(lines.len(), thread_count * items_per_thread, "Total items mismatch");

  // Cross-thread order is unspecified, but each thread's own order holds.
  for t_id in 0..thread_count {
    let prefix = format!("t{}_", t_id);
    let own: Vec<&str> = lines.iter().copied().filter(|l| l.starts_with(&prefix)).collect();
    let expected: Vec<String> = (0..items_per_thread).map(|i| format!("t{}_i{}", t_id, i)).collect();
    assert_eq!(own, expected);
  }
}

#[test]
fn test_rotate_and_reset_loses_nothing_under_appends() {
  let mut opts = LogOptions::default();
  opts.sync_mode = SyncMode::Async;
  let env = TestEnv::new(opts);
  let stream = "busy";
  env.store.append(stream, "seed").unwrap();

  let writers = 4;
  let per_writer = 250;
  let done = Arc::new(AtomicBool::new(false));

  let mut handles = Vec::new();
  for w in 0..writers {
    let store = env.store.clone();
    handles.push(thread::spawn(move || {
      for i in 0..per_writer {
        store.append(stream, &format!("w{}_{}", w, i)).unwrap();
      }
    }));
  }

  let rotator = {
    let store = env.store.clone();
    let done = done.clone();
    thread::spawn(move || {
      let mut archives = Vec::new();
      let mut n = 0;
      while !done.load(Ordering::Acquire) {
        let archive = format!("busy-{}", n);
        store.rotate_and_reset(stream, &archive).unwrap();
        archives.push(archive);
        n += 1;
      }
      archives
    })
  };

  for h in handles {
    h.join().unwrap();
  }
  done.store(true, Ordering::Release);
  let archives = rotator.join().unwrap();

  let mut seen = Vec::new();
  for archive in &archives {
    seen.extend(env.store.retrieve(archive).unwrap().lines().map(String::from));
  }
  seen.extend(env.raw_stream(stream).lines().map(String::from));

  let unique: HashSet<&String> = seen.iter().collect();
  assert_eq!(seen.len(), unique.len(), "an entry was archived twice");
  assert_eq!(seen.len(), 1 + writers * per_writer, "an entry was lost");
}

#[test]
fn test_parallel_rotation_of_distinct_streams() {
  let env = TestEnv::with_default();
  let streams: Vec<String> = (0..8).map(|i| format!("s{}", i)).collect();
  for s in &streams {
    env.store.append(s, &format!("hello from {}", s)).unwrap();
  }

  let barrier = Arc::new(Barrier::new(streams.len()));
  let handles: Vec<_> = streams
    .iter()
    .cloned()
    .map(|s| {
      let store = env.store.clone();
      let barrier = barrier.clone();
      thread::spawn(move || {
        barrier.wait();
        store.rotate_and_reset(&s, &format!("{}-archive", s)).unwrap();
      })
    })
    .collect();

  for h in handles {
    h.join().unwrap();
  }

  for s in &streams {
    assert_eq!(env.raw_stream(s), "");
    assert_eq!(
      env.store.retrieve(&format!("{}-archive", s)).unwrap(),
      format!("hello from {}\n", s)
    );
  }
}

#[test]
fn test_racing_rotations_into_one_archive() {
  let env = TestEnv::with_default();
  env.store.append("a", "from a").unwrap();
  env.store.append("b", "from b").unwrap();

  let barrier = Arc::new(Barrier::new(2));
  let handles: Vec<_> = ["a", "b"]
    .into_iter()
    .map(|s| {
      let store = env.store.clone();
      let barrier = barrier.clone();
      thread::spawn(move || {
        barrier.wait();
        store.rotate(s, "contested").map(|_| s)
      })
    })
    .collect();

  let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
  let winners: Vec<&str> = results.iter().filter_map(|r| r.as_ref().ok().copied()).collect();
  assert_eq!(winners.len(), 1, "exactly one rotation must win");

  let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
  assert!(matches!(loser, ironlog::Error::AlreadyExists(_)));

  assert_eq!(env.store.retrieve("contested").unwrap(), format!("from {}\n", winners[0]));
}
