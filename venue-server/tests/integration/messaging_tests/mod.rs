mod test_raise_hand_fanout;
