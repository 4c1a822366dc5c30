//! Tilt sensor fan-out through the hub router

use movehub_rs::{HubConfig, MockConnection, MoveHub, Port, SensorValue, SubscriptionId, TiltMode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

fn hub() -> (Arc<MockConnection>, Arc<MoveHub>) {
    let conn = Arc::new(MockConnection::new());
    let hub = Arc::new(MoveHub::new(conn.clone(), &HubConfig::default()).unwrap());
    (conn, hub)
}

// SENSOR_DATA packet for the tilt sensor port
fn tilt_packet(primary: u8, secondary: u8) -> Vec<u8> {
    vec![0x06, 0x00, 0x45, 0x3A, primary, secondary]
}

#[test]
fn test_two_subscribers_each_called_once() {
    let (_, hub) = hub();
    let sensor = hub.tilt_sensor();

    let seen_a = Arc::new(Mutex::new(Vec::new()));
    let seen_b = Arc::new(Mutex::new(Vec::new()));

    let a = seen_a.clone();
    sensor.subscribe(move |v| a.lock().unwrap().push(*v), TiltMode::Basic).unwrap();
    let b = seen_b.clone();
    sensor.subscribe(move |v| b.lock().unwrap().push(*v), TiltMode::Basic).unwrap();

    hub.handle_packet(&tilt_packet(0x05, 0x00));

    assert_eq!(*seen_a.lock().unwrap(), vec![SensorValue::TiltBasic(5)]);
    assert_eq!(*seen_b.lock().unwrap(), vec![SensorValue::TiltBasic(5)]);
}

#[test]
fn test_unsubscribe_during_delivery_does_not_skip_others() {
    let (_, hub) = hub();
    let sensor = hub.tilt_sensor();

    // the remover subscribes first so it is called before the victim
    let victim_id = Arc::new(Mutex::new(None::<SubscriptionId>));
    let removed = Arc::new(AtomicUsize::new(0));
    let sensor_for_remover = sensor.clone();
    let victim_for_remover = victim_id.clone();
    let removed_for_remover = removed.clone();
    sensor
        .subscribe(
            move |_| {
                if let Some(id) = victim_for_remover.lock().unwrap().take() {
                    if sensor_for_remover.unsubscribe(id).is_ok() {
                        removed_for_remover.fetch_add(1, Ordering::SeqCst);
                    }
                }
            },
            TiltMode::Basic,
        )
        .unwrap();

    let victim_calls = Arc::new(AtomicUsize::new(0));
    let counter = victim_calls.clone();
    let id = sensor
        .subscribe(
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            TiltMode::Basic,
        )
        .unwrap();
    *victim_id.lock().unwrap() = Some(id);

    // removed mid-delivery, but still gets the packet being delivered
    hub.handle_packet(&tilt_packet(0x01, 0x00));
    assert_eq!(removed.load(Ordering::SeqCst), 1);
    assert_eq!(victim_calls.load(Ordering::SeqCst), 1);
    assert!(!sensor.is_subscribed(id));

    hub.handle_packet(&tilt_packet(0x02, 0x00));
    assert_eq!(victim_calls.load(Ordering::SeqCst), 1);
    assert_eq!(sensor.subscriber_count(), 1);
    assert_eq!(sensor.mode(), TiltMode::Basic);
}

#[test]
fn test_concurrent_delivery_and_subscription_changes() {
    let (_, hub) = hub();
    let sensor = hub.tilt_sensor();

    let stable_calls = Arc::new(AtomicUsize::new(0));
    let counter = stable_calls.clone();
    sensor
        .subscribe(
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            TiltMode::Full,
        )
        .unwrap();

    let delivery_hub = hub.clone();
    let delivery = thread::spawn(move || {
        for i in 0..500u32 {
            delivery_hub.handle_packet(&tilt_packet((i % 180) as u8, 0x10));
        }
    });

    let mut ids: Vec<SubscriptionId> = Vec::new();
    for _ in 0..100 {
        ids.push(sensor.subscribe(|_| {}, TiltMode::Full).unwrap());
        if ids.len() > 3 {
            sensor.unsubscribe(ids.remove(0)).unwrap();
        }
    }

    delivery.join().unwrap();
    assert_eq!(stable_calls.load(Ordering::SeqCst), 500);
    assert_eq!(sensor.subscriber_count(), 1 + ids.len());
    assert_eq!(sensor.mode(), TiltMode::Full);
}

#[test]
fn test_full_mode_signed_degrees() {
    let (_, hub) = hub();
    let (_, rx) = hub.tilt_sensor().subscribe_channel(TiltMode::Full, 4).unwrap();

    hub.handle_packet(&tilt_packet(90, 91));
    hub.handle_packet(&tilt_packet(0xFF, 0x00));

    assert_eq!(rx.try_recv().unwrap(), SensorValue::TiltFull { roll: 90, pitch: -165 });
    assert_eq!(rx.try_recv().unwrap(), SensorValue::TiltFull { roll: -1, pitch: 0 });
}

#[test]
fn test_last_unsubscribe_turns_sensor_off() {
    let (conn, hub) = hub();
    let sensor = hub.tilt_sensor();

    let (id, rx) = sensor.subscribe_channel(TiltMode::Basic, 4).unwrap();
    sensor.unsubscribe(id).unwrap();

    assert_eq!(
        conn.last_packet().unwrap(),
        vec![0x0A, 0x00, 0x41, 0x3A, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01]
    );

    // late packet after unsubscribe is dropped
    hub.handle_packet(&tilt_packet(0x05, 0x00));
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_unsubscribe_through_hub_device_turns_sensor_off() {
    let (conn, hub) = hub();
    let id = hub.tilt_sensor().subscribe(|_| {}, TiltMode::Basic).unwrap();

    let device = hub.device(Port::TiltSensor).unwrap();
    assert_eq!(device.peripheral().subscriber_count(), 1);

    device.as_tilt().unwrap().unsubscribe(id).unwrap();

    assert_eq!(device.peripheral().subscriber_count(), 0);
    assert_eq!(hub.tilt_sensor().mode(), TiltMode::Off);
    assert_eq!(conn.write_count(), 2);
    assert_eq!(
        conn.last_packet().unwrap(),
        vec![0x0A, 0x00, 0x41, 0x3A, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01]
    );
}
