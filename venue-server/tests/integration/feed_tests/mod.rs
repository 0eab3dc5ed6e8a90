mod test_feed_preemption;
